use crate::config::types::{Config, MergeSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn new() -> Result<Self> {
        let settings = Self::load_settings().unwrap_or_default();
        Ok(Self { settings })
    }

    fn load_settings() -> Result<MergeSettings> {
        let path = Path::new("settings.json");
        if !path.exists() {
            return Ok(MergeSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}
