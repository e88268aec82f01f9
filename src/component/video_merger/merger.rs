use super::engine::MediaEngine;
use super::error::{FastMergeError, FatalMergeError};
use log::info;
use std::path::{Path, PathBuf};

/// 快速路徑：串流複製串接，不碰編碼資料
///
/// 只有在相容性檢查通過時才會被嘗試；失敗時引擎已保證不留下半成品
pub struct FastMerger<'a, E: MediaEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: MediaEngine + ?Sized> FastMerger<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), FastMergeError> {
        self.engine
            .concat_stream_copy(inputs, output)
            .map_err(FastMergeError::from)
    }
}

/// 慢速路徑：全部重新編碼到目標解析度
///
/// 解析度不同的輸入會先等比縮放再補黑邊；preset 偏向速度
pub struct SlowMerger<'a, E: MediaEngine + ?Sized> {
    engine: &'a E,
    target_width: u32,
    target_height: u32,
    preset: String,
}

impl<'a, E: MediaEngine + ?Sized> SlowMerger<'a, E> {
    pub fn new(engine: &'a E, target_width: u32, target_height: u32, preset: &str) -> Self {
        Self {
            engine,
            target_width,
            target_height,
            preset: preset.to_string(),
        }
    }

    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), FatalMergeError> {
        info!(
            "重新編碼 {} 個輸入到 {}x{} (preset: {})",
            inputs.len(),
            self.target_width,
            self.target_height,
            self.preset
        );
        self.engine
            .concat_reencode(
                inputs,
                output,
                self.target_width,
                self.target_height,
                &self.preset,
            )
            .map_err(FatalMergeError::from)
    }
}
