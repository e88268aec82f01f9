use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// 影片檔案的串流屬性，探測完成後不再變動
///
/// 相容性判斷只使用 codec、解析度與幀率；時長僅供結果報告使用
#[derive(Debug, Clone, PartialEq)]
pub struct MediaDescriptor {
    pub path: PathBuf,
    pub codec_id: String,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_seconds: Option<f64>,
}

impl MediaDescriptor {
    /// 幀率的浮點表示（den 保證大於 0）
    #[must_use]
    pub fn frame_rate(&self) -> f64 {
        f64::from(self.fps_num) / f64::from(self.fps_den)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("無法執行 ffprobe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffprobe 執行失敗: {stderr}")]
    ToolFailed { stderr: String },

    #[error("無法解析 ffprobe 輸出: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("找不到視訊串流: {}", path.display())]
    NoVideoStream { path: PathBuf },

    #[error("缺少必要欄位 {field}: {}", path.display())]
    MissingField { field: &'static str, path: PathBuf },
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片的合併決策屬性（唯讀，不會變動來源檔案）
pub fn probe(path: &Path) -> Result<MediaDescriptor, ProbeError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(ProbeError::ToolFailed { stderr });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(path, &stdout)
}

/// 從 ffprobe 的 JSON 輸出組出 `MediaDescriptor`
///
/// 任何決策必要欄位缺漏都回傳錯誤，讓上層直接走重新編碼路徑
fn parse_probe_output(path: &Path, json: &str) -> Result<MediaDescriptor, ProbeError> {
    let probe: FfprobeOutput = serde_json::from_str(json)?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| ProbeError::NoVideoStream {
            path: path.to_path_buf(),
        })?;

    let missing = |field: &'static str| ProbeError::MissingField {
        field,
        path: path.to_path_buf(),
    };

    let codec_id = video_stream
        .codec_name
        .clone()
        .ok_or_else(|| missing("codec_name"))?;
    let width = video_stream.width.ok_or_else(|| missing("width"))?;
    let height = video_stream.height.ok_or_else(|| missing("height"))?;

    let (fps_num, fps_den) = video_stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .ok_or_else(|| missing("r_frame_rate"))?;

    // 時長優先取 format，其次取 stream；缺漏不影響合併策略
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(video_stream.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok());

    Ok(MediaDescriptor {
        path: path.to_path_buf(),
        codec_id,
        width,
        height,
        fps_num,
        fps_den,
        duration_seconds,
    })
}

/// 解析幀率字串（例如 "30/1"、"30000/1001" 或 "29.97"）成有理數
fn parse_frame_rate(rate: &str) -> Option<(u32, u32)> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: u32 = num_str.trim().parse().ok()?;
        let den: u32 = den_str.trim().parse().ok()?;
        if num > 0 && den > 0 {
            return Some((num, den));
        }
        return None;
    }

    // 小數形式以千分之一精度轉成有理數
    let value: f64 = rate.trim().parse().ok()?;
    if value <= 0.0 {
        return None;
    }
    Some(((value * 1000.0).round() as u32, 1000))
}
