use std::path::{Path, PathBuf};

use anyhow::Context;
use tiksave_core::fs_paths::{AppPaths, DesktopPaths};
use tiksave_core::AppSettings;

pub fn default_settings_path() -> PathBuf {
    DesktopPaths.settings_file()
}

/// Load settings from `path`, or from the per-user settings file when `None`.
///
/// A missing file yields the defaults; a file that exists but does not parse
/// is an error.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<AppSettings> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_settings_path);

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no settings at {}, using defaults", path.display());
            return Ok(AppSettings::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let settings = serde_json::from_str::<AppSettings>(&raw)
        .with_context(|| format!("invalid settings file {}", path.display()))?;
    tracing::debug!("loaded settings from {}", path.display());
    Ok(settings)
}
