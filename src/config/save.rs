use crate::config::types::{MAX_RECENT_PATHS, MergeSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &MergeSettings) -> Result<()> {
    // Save to settings.json in the current working directory
    let path = Path::new("settings.json");
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// 更新最近使用的路徑：加到最前面、去重、限制數量
pub fn add_recent_path(settings: &mut MergeSettings, path: &str) {
    settings.recent_paths.retain(|p| p != path);
    settings.recent_paths.insert(0, path.to_string());
    settings.recent_paths.truncate(MAX_RECENT_PATHS);
}
