//! 整合測試 - 需要系統安裝 ffmpeg / ffprobe（含 libx264），否則自動跳過
//!
//! 用 lavfi 產生小測試影片，驗證快速與慢速兩條合併路徑的實際行為

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use auto_video_merge::component::video_merger::{
    FfmpegEngine, MediaEngine, MergeMethod, MergeOrchestrator, MergeRequest,
};
use auto_video_merge::config::{EncoderPreset, MergeSettings};

/// ffmpeg、ffprobe 與 libx264 都在才跑整合測試
fn ffmpeg_ready() -> bool {
    let tools_ok = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .is_ok_and(|o| o.status.success())
        && Command::new("ffprobe")
            .arg("-version")
            .output()
            .is_ok_and(|o| o.status.success());
    if !tools_ok {
        return false;
    }

    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .is_ok_and(|o| String::from_utf8_lossy(&o.stdout).contains("libx264"))
}

/// 產生一秒長的測試影片（testsrc2 畫面 + 正弦波音訊）
fn make_clip(path: &Path, width: u32, height: u32, rate: u32) {
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-f", "lavfi", "-i"])
        .arg(format!(
            "testsrc2=duration=1:size={width}x{height}:rate={rate}"
        ))
        .args([
            "-f", "lavfi",
            "-i", "sine=frequency=440:duration=1",
            "-shortest",
            "-c:v", "libx264",
            "-preset", "ultrafast",
            "-pix_fmt", "yuv420p",
            "-c:a", "aac",
        ])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "無法產生測試影片: {}", path.display());
}

fn test_settings() -> MergeSettings {
    MergeSettings {
        target_width: 640,
        target_height: 360,
        encoder_preset: EncoderPreset::Ultrafast,
        ..MergeSettings::default()
    }
}

fn orchestrator() -> MergeOrchestrator<FfmpegEngine> {
    let engine = Arc::new(FfmpegEngine::new(Arc::new(AtomicBool::new(false))));
    MergeOrchestrator::new(engine, test_settings())
}

fn probe_output(path: &Path) -> (u32, u32, f64) {
    let engine = FfmpegEngine::new(Arc::new(AtomicBool::new(false)));
    let desc = engine.probe(path).unwrap();
    (desc.width, desc.height, desc.duration_seconds.unwrap_or(0.0))
}

/// 測試 1: 三個屬性一致的輸入走快速路徑，輸出時長約等於輸入總和
#[test]
fn test_fast_merge_uniform_inputs() {
    if !ffmpeg_ready() {
        println!("跳過測試：系統沒有可用的 ffmpeg/ffprobe/libx264");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut inputs = Vec::new();
    for i in 1..=3 {
        let clip = dir.path().join(format!("clip_{i:02}.mp4"));
        make_clip(&clip, 320, 240, 30);
        inputs.push(clip);
    }
    let output = dir.path().join("fast_merged.mp4");

    let request = MergeRequest::new(inputs, output.clone());
    let result = orchestrator().run(&request).unwrap();

    assert_eq!(result.method_used, MergeMethod::Fast);
    assert!(output.exists());
    assert!(result.size_bytes > 0);

    let (width, height, duration) = probe_output(&output);
    assert_eq!((width, height), (320, 240), "串流複製不應改變解析度");
    assert!(
        (duration - 3.0).abs() < 0.5,
        "輸出時長應接近輸入總和，實際 {duration:.2}s"
    );
}

/// 測試 2: 解析度不同的輸入走慢速路徑，輸出統一成目標解析度
#[test]
fn test_slow_merge_mixed_resolution() {
    if !ffmpeg_ready() {
        println!("跳過測試：系統沒有可用的 ffmpeg/ffprobe/libx264");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let small = dir.path().join("clip_01.mp4");
    let large = dir.path().join("clip_02.mp4");
    make_clip(&small, 320, 240, 30);
    make_clip(&large, 640, 360, 30);
    let output = dir.path().join("slow_merged.mp4");

    let request = MergeRequest::new(vec![small, large], output.clone());
    let result = orchestrator().run(&request).unwrap();

    assert_eq!(result.method_used, MergeMethod::Slow);
    assert!(output.exists());

    let (width, height, duration) = probe_output(&output);
    assert_eq!((width, height), (640, 360), "輸出解析度應等於設定的目標");
    assert!(
        (duration - 2.0).abs() < 0.5,
        "輸出時長應接近輸入總和，實際 {duration:.2}s"
    );
}

/// 測試 3: 幀率不同的輸入不能走快速路徑
#[test]
fn test_mixed_frame_rate_uses_slow_path() {
    if !ffmpeg_ready() {
        println!("跳過測試：系統沒有可用的 ffmpeg/ffprobe/libx264");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("clip_01.mp4");
    let b = dir.path().join("clip_02.mp4");
    make_clip(&a, 320, 240, 30);
    make_clip(&b, 320, 240, 25);
    let output = dir.path().join("rate_merged.mp4");

    let request = MergeRequest::new(vec![a, b], output.clone());
    let result = orchestrator().run(&request).unwrap();

    assert_eq!(result.method_used, MergeMethod::Slow);
    assert!(output.exists());
}

/// 測試 4: 無法解碼的輸入讓慢速路徑也失敗時，不能留下不完整的輸出檔
#[test]
fn test_unreadable_input_fails_without_partial_output() {
    if !ffmpeg_ready() {
        println!("跳過測試：系統沒有可用的 ffmpeg/ffprobe/libx264");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("clip_01.mp4");
    make_clip(&good, 320, 240, 30);

    // 這不是影片，探測會失敗，直接跳過快速路徑
    let garbage = dir.path().join("clip_02.mp4");
    std::fs::write(&garbage, b"this is not a video file").unwrap();

    let output: PathBuf = dir.path().join("broken_merged.mp4");
    let request = MergeRequest::new(vec![good, garbage], output.clone());

    let result = orchestrator().run(&request);
    assert!(result.is_err(), "無法解碼的輸入應讓整個請求失敗");
    assert!(!output.exists(), "失敗的合併不能留下輸出檔");
}
