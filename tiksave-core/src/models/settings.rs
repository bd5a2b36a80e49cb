use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub download: DownloadSettings,
    pub browser: BrowserSettings,
    pub selectors: Selectors,
}

/// What to do with files already written when a multi-file extraction fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    #[default]
    KeepPartial,
    RemoveWritten,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub default_output_dir: Option<PathBuf>,
    pub rollback: RollbackPolicy,
    /// Upper bound for the browser-driven video save to land on disk.
    pub download_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub chrome_executable: Option<PathBuf>,
    pub element_timeout_secs: u64,
    pub navigation_timeout_secs: u64,
    pub extra_args: Vec<String>,
}

/// CSS selectors for the page elements each extractor reads.
///
/// The site's generated class names change often, so these live in settings
/// rather than in extractor code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub video: String,
    pub audio: String,
    pub description_meta: String,
    pub author_handle: String,
    pub music_link: String,
    pub photo_slide: String,
    pub music_author_link: String,
    pub music_clip_count: String,
    pub music_clip_link: String,
    pub music_thumbnail: String,
}

impl DownloadSettings {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl BrowserSettings {
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            default_output_dir: None,
            rollback: RollbackPolicy::KeepPartial,
            download_timeout_secs: 120,
            poll_interval_ms: 500,
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            element_timeout_secs: 10,
            navigation_timeout_secs: 30,
            extra_args: Vec::new(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            video: "video".into(),
            audio: "audio".into(),
            description_meta: "meta[property='og:description']".into(),
            author_handle: ".css-1c7urt-SpanUniqueId.evv7pft1".into(),
            music_link: ".epjbyn1.css-v80f7r-StyledLink-StyledLink.er1vbsz0".into(),
            photo_slide: ".css-brxox6-ImgPhotoSlide.e10jea832".into(),
            music_author_link: ".css-22xkqc-StyledLink.er1vbsz0".into(),
            music_clip_count: "strong[style='font-weight: normal;']".into(),
            music_clip_link: ".css-1wrhn5c-AMetaCaptionLine.eih2qak0".into(),
            music_thumbnail: ".css-uur1tb-DivMusicCardContainer.ervjp3i1".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "download": { "rollback": "remove_written" },
            "selectors": { "video": "video.player" }
        }"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.download.rollback, RollbackPolicy::RemoveWritten);
        assert_eq!(settings.download.download_timeout_secs, 120);
        assert_eq!(settings.selectors.video, "video.player");
        assert_eq!(settings.selectors.audio, "audio");
        assert_eq!(settings.browser.element_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn empty_object_is_default() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.download.rollback, RollbackPolicy::KeepPartial);
        assert_eq!(settings.download.poll_interval(), Duration::from_millis(500));
    }
}
