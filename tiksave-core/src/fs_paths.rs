use std::path::PathBuf;

const APP_DIR: &str = "tiksave";
const SETTINGS_FILE: &str = "settings.json";

pub trait AppPaths: Send + Sync {
    fn config_dir(&self) -> PathBuf;

    fn settings_file(&self) -> PathBuf {
        self.config_dir().join(SETTINGS_FILE)
    }
}

pub struct DesktopPaths;

impl AppPaths for DesktopPaths {
    fn config_dir(&self) -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
