use super::error::EngineError;
use crate::tools::{ConcatCommand, ConcatInvocation, MediaDescriptor, ProbeError, probe};
use log::{info, warn};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// 外部轉檔引擎的邊界
///
/// 協調器只透過這個介面操作 ffmpeg / ffprobe，測試時用假引擎
/// 就能驗證整個狀態機，不需要真的編碼影片
pub trait MediaEngine: Send + Sync {
    /// 唯讀探測，失敗時上層會放棄快速路徑
    fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError>;

    /// 串流複製模式：concat demuxer + codec copy
    fn concat_stream_copy(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineError>;

    /// 重新編碼模式：縮放補邊後串接，輸出統一解析度
    fn concat_reencode(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        width: u32,
        height: u32,
        preset: &str,
    ) -> Result<(), EngineError>;
}

/// 以子程序呼叫 ffmpeg 的真實引擎
///
/// 子程序執行期間輪詢中斷旗標，收到中斷就終止程序並清掉不完整的輸出
pub struct FfmpegEngine {
    shutdown_signal: Arc<AtomicBool>,
}

impl FfmpegEngine {
    #[must_use]
    pub fn new(shutdown_signal: Arc<AtomicBool>) -> Self {
        Self { shutdown_signal }
    }

    fn run_to_completion(
        &self,
        mut invocation: ConcatInvocation,
        output: &Path,
    ) -> Result<(), EngineError> {
        invocation.command.stdout(Stdio::null());
        invocation.command.stderr(Stdio::piped());

        let mut child = invocation.command.spawn().map_err(EngineError::Spawn)?;
        let pid = child.id();

        let status = loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷信號，終止 ffmpeg [{pid}]");
                let _ = child.kill();
                let _ = child.wait();
                remove_partial_output(output);
                return Err(EngineError::Cancelled);
            }

            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(Duration::from_millis(200)),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    remove_partial_output(output);
                    return Err(EngineError::Failed(format!("無法檢查程序狀態 [{pid}]: {e}")));
                }
            }
        };

        if status.success() {
            return Ok(());
        }

        let stderr = child
            .stderr
            .take()
            .map(|s| {
                BufReader::new(s)
                    .lines()
                    .map_while(Result::ok)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_else(|| "未知錯誤".to_string());

        remove_partial_output(output);
        Err(classify_failure(&stderr))
    }
}

impl MediaEngine for FfmpegEngine {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError> {
        probe(path)
    }

    fn concat_stream_copy(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineError> {
        let invocation = ConcatCommand::stream_copy(inputs, output)
            .build_command()
            .map_err(|e| EngineError::Failed(format!("無法建立 concat 清單: {e}")))?;
        self.run_to_completion(invocation, output)
    }

    fn concat_reencode(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        width: u32,
        height: u32,
        preset: &str,
    ) -> Result<(), EngineError> {
        let invocation = ConcatCommand::reencode(inputs, output, width, height, preset)
            .build_command()
            .map_err(|e| EngineError::Failed(format!("無法建立 ffmpeg 命令: {e}")))?;
        self.run_to_completion(invocation, output)
    }
}

/// 失敗後清掉不完整的輸出檔，合併失敗不能留下壞檔
fn remove_partial_output(output: &Path) {
    if !output.exists() {
        return;
    }
    match fs::remove_file(output) {
        Ok(()) => info!("已刪除不完整的輸出檔案: {}", output.display()),
        Err(e) => warn!("無法刪除不完整的輸出檔案 {}: {e}", output.display()),
    }
}

/// concat demuxer 對串流參數不一致會報這類訊息；其餘失敗視為一般錯誤
const INCOMPATIBLE_MARKERS: &[&str] = &[
    "do not match",
    "non-monotonic",
    "non-monotonous",
    "mismatch",
    "incompatible",
];

fn classify_failure(stderr: &str) -> EngineError {
    let lower = stderr.to_lowercase();
    let message = stderr.trim().to_string();

    if INCOMPATIBLE_MARKERS.iter().any(|m| lower.contains(m)) {
        EngineError::IncompatibleStreams(message)
    } else {
        EngineError::Failed(message)
    }
}
