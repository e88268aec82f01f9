use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const MAX_RECENT_PATHS: usize = 5;

/// x264 編碼 preset，速度與壓縮率的取捨
///
/// 合併服務偏向速度，預設 veryfast（這是明確的策略選擇，不是沿用編碼器預設值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Fast,
    Medium,
}

impl EncoderPreset {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Fast => "fast",
            Self::Medium => "medium",
        }
    }
}

impl fmt::Display for EncoderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// 重新編碼路徑的目標解析度
    pub target_width: u32,
    pub target_height: u32,
    pub encoder_preset: EncoderPreset,
    /// 幀率比較的容差（約分後仍不相等時，比較浮點比值）
    pub frame_rate_epsilon: f64,
    /// 同時執行的合併請求上限
    pub max_concurrent_merges: usize,
    pub video_extensions: Vec<String>,
    pub recent_paths: Vec<String>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            target_width: 1920,
            target_height: 1080,
            encoder_preset: EncoderPreset::Veryfast,
            frame_rate_epsilon: 0.001,
            max_concurrent_merges: 2,
            video_extensions: [
                ".mp4", ".mkv", ".mov", ".avi", ".webm", ".m4v", ".ts", ".flv", ".wmv",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            recent_paths: Vec::new(),
        }
    }
}

impl MergeSettings {
    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = format!(".{}", ext.to_lowercase());
                self.video_extensions.iter().any(|e| e.to_lowercase() == ext)
            })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: MergeSettings,
}
