use crate::config::MergeSettings;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 合併輸出的檔名字尾，掃描時跳過以免重跑時把舊輸出也納入
pub const MERGED_SUFFIX: &str = "_merged";

#[derive(Debug, Clone)]
pub struct VideoFileInfo {
    pub path: PathBuf,
    pub size: u64,
}

/// 掃描資料夾第一層的影片檔，依檔名排序（排序結果就是合併順序）
pub fn scan_video_files(directory: &Path, settings: &MergeSettings) -> Result<Vec<VideoFileInfo>> {
    let mut video_files: Vec<VideoFileInfo> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| settings.is_video_file(entry.path()))
        .filter(|entry| !is_merged_output(entry.path()))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            Some(VideoFileInfo {
                path: entry.into_path(),
                size: metadata.len(),
            })
        })
        .collect();

    video_files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(video_files)
}

fn is_merged_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(MERGED_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_sorts_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let settings = MergeSettings::default();

        for name in ["clip_03.mp4", "clip_01.mp4", "clip_02.mp4", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = scan_video_files(dir.path(), &settings).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["clip_01.mp4", "clip_02.mp4", "clip_03.mp4"]);
    }

    #[test]
    fn test_scan_skips_merged_outputs_and_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        let settings = MergeSettings::default();

        fs::write(dir.path().join("clip_01.mp4"), b"x").unwrap();
        fs::write(dir.path().join("trip_merged.mp4"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/clip_02.mp4"), b"x").unwrap();

        let files = scan_video_files(dir.path(), &settings).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("clip_01.mp4"));
    }
}
