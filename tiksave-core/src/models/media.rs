use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::url_parser::ContentVariant;

/// Input of a single `download()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRequest {
    pub source_url: String,
    pub download_directory: PathBuf,
    pub debug_enabled: bool,
}

impl MediaRequest {
    pub fn new(source_url: impl Into<String>, download_directory: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            download_directory: download_directory.into(),
            debug_enabled: false,
        }
    }

    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    pub author_username: Option<String>,
    pub music_uri: Option<String>,
    pub files: Vec<PathBuf>,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoResult {
    pub author_username: Option<String>,
    pub music_uri: Option<String>,
    pub files: Vec<PathBuf>,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicAuthor {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicResult {
    pub author: MusicAuthor,
    pub thumbnail_url: Option<String>,
    pub clip_count: u64,
    pub clip_urls: Vec<String>,
    pub music_url: String,
    pub files: Vec<PathBuf>,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtractionResult {
    Video(VideoResult),
    Photo(PhotoResult),
    Music(MusicResult),
}

impl ExtractionResult {
    pub fn variant(&self) -> ContentVariant {
        match self {
            Self::Video(_) => ContentVariant::Video,
            Self::Photo(_) => ContentVariant::PhotoCarousel,
            Self::Music(_) => ContentVariant::AudioTrack,
        }
    }

    /// The `type` tag as printed by the CLI.
    pub fn type_name(&self) -> &'static str {
        self.variant().type_name()
    }

    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Video(r) => &r.files,
            Self::Photo(r) => &r.files,
            Self::Music(r) => &r.files,
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            Self::Video(r) => &r.source_url,
            Self::Photo(r) => &r.source_url,
            Self::Music(r) => &r.source_url,
        }
    }
}

/// Files created by the current call, as opposed to ones that already existed.
#[derive(Debug, Default)]
pub struct WrittenFiles {
    paths: Vec<PathBuf>,
}

impl WrittenFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: &Path) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every recorded file. Failures are logged and skipped.
    pub async fn remove_all(&mut self) {
        for path in self.paths.drain(..) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("removed partial file {}", path.display()),
                Err(e) => tracing::warn!("could not remove {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_with_type_tag() {
        let result = ExtractionResult::Video(VideoResult {
            author_username: Some("alice".into()),
            music_uri: None,
            files: vec![PathBuf::from("/tmp/Hello_World.mp4")],
            source_url: "https://www.tiktok.com/@alice/video/111".into(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["author_username"], "alice");
        assert_eq!(result.type_name(), "video");
        assert_eq!(result.files().len(), 1);
    }

    #[test]
    fn music_result_uses_music_tag() {
        let result = ExtractionResult::Music(MusicResult {
            author: MusicAuthor {
                name: "someone".into(),
                url: None,
            },
            thumbnail_url: None,
            clip_count: 5,
            clip_urls: Vec::new(),
            music_url: "https://cdn/m.mp3".into(),
            files: vec![PathBuf::from("/tmp/someone.mp3")],
            source_url: "https://www.tiktok.com/music/some-track-333".into(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "music");
        assert_eq!(json["clip_count"], 5);
        assert_eq!(result.variant(), ContentVariant::AudioTrack);
    }

    #[test]
    fn written_files_records_each_path_once() {
        let mut written = WrittenFiles::new();
        written.record(Path::new("/tmp/a.jpg"));
        written.record(Path::new("/tmp/a.jpg"));
        written.record(Path::new("/tmp/b.jpg"));
        assert_eq!(written.paths().len(), 2);
    }

    #[tokio::test]
    async fn remove_all_deletes_recorded_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1_title.jpg");
        std::fs::write(&path, b"x").unwrap();

        let mut written = WrittenFiles::new();
        written.record(&path);
        written.remove_all().await;

        assert!(!path.exists());
        assert!(written.is_empty());
    }
}
