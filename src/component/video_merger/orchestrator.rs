use super::compatibility::is_uniform;
use super::engine::MediaEngine;
use super::error::{FastMergeError, FatalMergeError, MergeError};
use super::merger::{FastMerger, SlowMerger};
use crate::config::MergeSettings;
use log::{error, info, warn};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 實際產出輸出檔的合併方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    Fast,
    Slow,
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("Fast"),
            Self::Slow => f.write_str("Slow"),
        }
    }
}

/// 一次合併請求：輸入順序就是輸出的串接順序
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

impl MergeRequest {
    #[must_use]
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self { inputs, output }
    }
}

/// 合併完成的結果，method_used 一定是實際產出檔案的那條路徑
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub output_path: PathBuf,
    pub method_used: MergeMethod,
    pub duration_taken: Duration,
    pub size_bytes: u64,
}

impl MergeResult {
    #[must_use]
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

/// 合併策略的決策核心
///
/// 流程是固定的線性狀態機：探測 -> 相容性檢查 -> 嘗試快速路徑 ->
/// （需要時）回退到慢速路徑。每條路徑最多嘗試一次，不重試。
/// 只有慢速路徑的失敗會回報給呼叫端，其餘錯誤都被回退吸收。
pub struct MergeOrchestrator<E: MediaEngine> {
    engine: Arc<E>,
    settings: MergeSettings,
}

impl<E: MediaEngine> MergeOrchestrator<E> {
    #[must_use]
    pub fn new(engine: Arc<E>, settings: MergeSettings) -> Self {
        Self { engine, settings }
    }

    pub fn run(&self, request: &MergeRequest) -> Result<MergeResult, MergeError> {
        if request.inputs.is_empty() {
            return Err(MergeError::EmptyRequest);
        }

        let started = Instant::now();
        info!(
            "開始合併 {} 個輸入 -> {}",
            request.inputs.len(),
            request.output.display()
        );

        // 探測全部輸入；任何一個失敗就無法證明一致性，直接放棄快速路徑
        let mut descriptors = Vec::with_capacity(request.inputs.len());
        let mut probe_failed = false;
        for input in &request.inputs {
            match self.engine.probe(input) {
                Ok(desc) => descriptors.push(desc),
                Err(e) => {
                    warn!("探測失敗（{}），改走重新編碼路徑: {e}", input.display());
                    probe_failed = true;
                    break;
                }
            }
        }

        let uniform =
            !probe_failed && is_uniform(&descriptors, self.settings.frame_rate_epsilon);

        if uniform {
            info!("輸入屬性一致，使用串流複製合併 (FAST mode - no re-encoding)");
            let fast = FastMerger::new(self.engine.as_ref());
            match fast.merge(&request.inputs, &request.output) {
                Ok(()) => return Ok(self.finish(request, MergeMethod::Fast, started)),
                Err(FastMergeError::Cancelled) => return Err(MergeError::Cancelled),
                Err(e) => warn!("Falling back to slow merge: {e}"),
            }
        } else if !probe_failed {
            info!("輸入屬性不一致，直接使用重新編碼合併");
        }

        let slow = SlowMerger::new(
            self.engine.as_ref(),
            self.settings.target_width,
            self.settings.target_height,
            self.settings.encoder_preset.as_str(),
        );
        match slow.merge(&request.inputs, &request.output) {
            Ok(()) => Ok(self.finish(request, MergeMethod::Slow, started)),
            Err(FatalMergeError::Cancelled) => Err(MergeError::Cancelled),
            Err(e) => {
                error!("重新編碼合併失敗（{}）: {e}", request.output.display());
                Err(MergeError::from(e))
            }
        }
    }

    fn finish(
        &self,
        request: &MergeRequest,
        method: MergeMethod,
        started: Instant,
    ) -> MergeResult {
        let result = MergeResult {
            output_path: request.output.clone(),
            method_used: method,
            duration_taken: started.elapsed(),
            size_bytes: fs::metadata(&request.output).map_or(0, |m| m.len()),
        };
        info!(
            "合併完成 ({method}): {}，{:.2} MB，耗時 {:.1}s",
            result.output_path.display(),
            result.size_mb(),
            result.duration_taken.as_secs_f64()
        );
        result
    }
}
