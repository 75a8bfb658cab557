use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::Result;

pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// `<stem>_<unix seconds>.json`
pub fn timestamped_name(stem: &str, timestamp: i64) -> String {
    format!("{}_{}.json", stem, timestamp)
}

/// Pretty-printed UTF-8 JSON at `path`, creating parent directories.
pub fn write_json_to<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body)?;
    info!("Saved {}", path.display());
    Ok(path.to_path_buf())
}

/// Write into `dir` under a fresh timestamped name.
pub fn write_json<T: Serialize + ?Sized>(dir: &Path, stem: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(timestamped_name(stem, Utc::now().timestamp()));
    write_json_to(&path, value)
}

/// Explicit path when given, otherwise a timestamped file in `dir`.
pub fn save<T: Serialize + ?Sized>(explicit: Option<&Path>, dir: &Path, stem: &str, value: &T) -> Result<PathBuf> {
    match explicit {
        Some(path) => write_json_to(path, value),
        None => write_json(dir, stem, value),
    }
}
