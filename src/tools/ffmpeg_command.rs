use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

/// ffmpeg 合併的兩種操作模式
#[derive(Debug, Clone)]
pub enum ConcatMode {
    /// 串流複製：不解碼、不重新編碼，只換容器
    StreamCopy,
    /// 重新編碼：統一輸出到目標解析度（必要時加黑邊）
    Reencode {
        width: u32,
        height: u32,
        preset: String,
    },
}

/// 一次 ffmpeg 合併呼叫的命令描述
pub struct ConcatCommand {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    mode: ConcatMode,
}

/// 可執行的 ffmpeg 呼叫
///
/// concat 清單檔的生命週期跟著這個結構，ffmpeg 結束前不會被刪除
pub struct ConcatInvocation {
    pub command: Command,
    _concat_list: Option<NamedTempFile>,
}

impl ConcatCommand {
    #[must_use]
    pub fn stream_copy(inputs: &[PathBuf], output: &Path) -> Self {
        Self {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
            mode: ConcatMode::StreamCopy,
        }
    }

    #[must_use]
    pub fn reencode(
        inputs: &[PathBuf],
        output: &Path,
        width: u32,
        height: u32,
        preset: &str,
    ) -> Self {
        Self {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
            mode: ConcatMode::Reencode {
                width,
                height,
                preset: preset.to_string(),
            },
        }
    }

    pub fn build_command(&self) -> std::io::Result<ConcatInvocation> {
        match &self.mode {
            ConcatMode::StreamCopy => self.build_stream_copy(),
            ConcatMode::Reencode {
                width,
                height,
                preset,
            } => Ok(self.build_reencode(*width, *height, preset)),
        }
    }

    fn build_stream_copy(&self) -> std::io::Result<ConcatInvocation> {
        let concat_list = write_concat_list(&self.inputs)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args([
            "-hide_banner",
            "-nostdin",
            "-loglevel", "error",
            "-y",
            "-fflags", "+genpts",
            "-f", "concat",
            "-safe", "0",
            "-i",
        ]);
        cmd.arg(concat_list.path());
        cmd.args(["-map", "0", "-c", "copy"]);
        cmd.arg(&self.output);

        Ok(ConcatInvocation {
            command: cmd,
            _concat_list: Some(concat_list),
        })
    }

    fn build_reencode(&self, width: u32, height: u32, preset: &str) -> ConcatInvocation {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]);

        for input in &self.inputs {
            cmd.arg("-i");
            cmd.arg(input);
        }

        cmd.arg("-filter_complex");
        cmd.arg(build_filter_graph(self.inputs.len(), width, height));

        cmd.args([
            "-map", "[outv]",
            "-map", "[outa]",
            "-c:v", "libx264",
            "-preset", preset,
            "-crf", "23",
            "-pix_fmt", "yuv420p",
            "-c:a", "aac",
            "-ar", "48000",
            "-ac", "2",
        ]);
        cmd.arg(&self.output);

        ConcatInvocation {
            command: cmd,
            _concat_list: None,
        }
    }
}

/// 產生 concat demuxer 的清單檔，一行一個 `file '<絕對路徑>'`
fn write_concat_list(inputs: &[PathBuf]) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("merge_concat_")
        .suffix(".txt")
        .tempfile()?;

    for input in inputs {
        let escaped = escape_concat_path(&input.to_string_lossy());
        writeln!(file, "file '{escaped}'")?;
    }
    file.flush()?;

    Ok(file)
}

/// concat 清單內的單引號跳脫（' -> '\''）
fn escape_concat_path(path: &str) -> String {
    path.replace('\'', "'\\''")
}

/// 每個輸入先縮放到目標框內再補黑邊，最後用 concat filter 串接
///
/// 音訊統一成 48kHz 立體聲，避免不同聲道配置讓 concat 失敗
fn build_filter_graph(input_count: usize, width: u32, height: u32) -> String {
    let mut graph = String::new();

    for i in 0..input_count {
        graph.push_str(&format!(
            "[{i}:v:0]scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1[v{i}];"
        ));
        graph.push_str(&format!(
            "[{i}:a:0]aformat=sample_fmts=fltp:sample_rates=48000:channel_layouts=stereo[a{i}];"
        ));
    }

    for i in 0..input_count {
        graph.push_str(&format!("[v{i}][a{i}]"));
    }
    graph.push_str(&format!("concat=n={input_count}:v=1:a=1[outv][outa]"));

    graph
}
