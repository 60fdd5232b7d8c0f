use std::{fs, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::detect::DetectionSettings;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_bind: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub detection: DetectionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5000".into(),
            upload_dir: "uploads".into(),
            max_upload_bytes: 16 * 1024 * 1024,
            detection: DetectionSettings::default(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Ok(file_cfg) = toml::from_str::<Settings>(&raw) {
            settings = file_cfg;
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("UPLOAD_DIR") {
        settings.upload_dir = v;
    }
    if let Ok(v) = std::env::var("APP__UPLOAD_DIR") {
        settings.upload_dir = v;
    }

    if let Ok(v) = std::env::var("APP__MAX_UPLOAD_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_upload_bytes = parsed;
        }
    }

    settings
}

/// Resolve the configured upload directory and make sure it exists.
pub fn prepare_upload_dir(raw_upload_dir: &str) -> anyhow::Result<PathBuf> {
    let path = PathBuf::from(normalize_upload_dir(raw_upload_dir));
    fs::create_dir_all(&path).with_context(|| {
        format!(
            "failed to create upload directory '{}'",
            path.display()
        )
    })?;
    Ok(path)
}

fn normalize_upload_dir(raw_upload_dir: &str) -> String {
    let trimmed = raw_upload_dir.trim();
    if trimmed.is_empty() {
        return Settings::default().upload_dir;
    }
    trimmed.to_string()
}
