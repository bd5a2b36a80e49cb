use std::path::{Path, PathBuf};

use crate::core::error::{DownloadError, FetchFailure};
use crate::core::filename::sanitize_file_name;
use crate::core::http_client::HttpClient;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub path: PathBuf,
    /// `false` when the file was already on disk and nothing was fetched.
    pub written: bool,
}

/// GET-and-save with existence-based idempotence.
///
/// A file already present at the target path counts as downloaded, whatever its
/// content.
pub struct ContentFetcher<'a, H: HttpClient + ?Sized> {
    http: &'a H,
    dir: &'a Path,
}

impl<'a, H: HttpClient + ?Sized> ContentFetcher<'a, H> {
    pub fn new(http: &'a H, dir: &'a Path) -> Self {
        Self { http, dir }
    }

    pub async fn fetch(&self, url: &str, file_name: &str) -> Result<FetchOutcome, DownloadError> {
        let file_name = sanitize_file_name(file_name);
        let path = absolute(&self.dir.join(&file_name));

        let fail = |source: FetchFailure| DownloadError {
            file_name: file_name.clone(),
            url: url.to_string(),
            source,
        };

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("file already exists: {}", path.display());
            return Ok(FetchOutcome {
                path,
                written: false,
            });
        }

        tracing::debug!("downloading {} from {}", file_name, url);
        let bytes = self
            .http
            .get_bytes(url)
            .await
            .map_err(|e| fail(e.into()))?;

        write_atomically(&path, &bytes)
            .await
            .map_err(|e| fail(e.into()))?;

        tracing::info!("saved {}", path.display());
        Ok(FetchOutcome {
            path,
            written: true,
        })
    }
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let part = part_path_for(path);
    if let Err(e) = tokio::fs::write(&part, bytes).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e);
    }
    tokio::fs::rename(&part, path).await
}

pub(crate) fn part_path_for(output: &Path) -> PathBuf {
    let mut part = output.as_os_str().to_owned();
    part.push(".part");
    PathBuf::from(part)
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::HttpError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHttp {
        gets: AtomicUsize,
        fail: bool,
    }

    impl CountingHttp {
        fn new() -> Self {
            Self {
                gets: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl HttpClient for CountingHttp {
        async fn resolve_redirect(&self, url: &str) -> Result<String, HttpError> {
            Ok(url.to_string())
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HttpError::Status {
                    status: 404,
                    url: url.to_string(),
                });
            }
            Ok(b"payload".to_vec())
        }
    }

    #[test]
    fn part_path_appends_suffix() {
        let output = Path::new("video.mp4");
        assert_eq!(part_path_for(output), PathBuf::from("video.mp4.part"));
    }

    #[test]
    fn part_path_nested() {
        let output = Path::new("downloads/tiktok/1_title.jpg");
        assert_eq!(
            part_path_for(output),
            PathBuf::from("downloads/tiktok/1_title.jpg.part")
        );
    }

    #[tokio::test]
    async fn fetch_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let http = CountingHttp::new();
        let fetcher = ContentFetcher::new(&http, dir.path());

        let outcome = fetcher.fetch("https://cdn/x.jpg", "1_title.jpg").await.unwrap();

        assert!(outcome.written);
        assert_eq!(outcome.path, dir.path().join("1_title.jpg"));
        assert_eq!(std::fs::read(&outcome.path).unwrap(), b"payload");
        assert!(!part_path_for(&outcome.path).exists());
    }

    #[tokio::test]
    async fn fetch_twice_gets_once() {
        let dir = tempfile::tempdir().unwrap();
        let http = CountingHttp::new();
        let fetcher = ContentFetcher::new(&http, dir.path());

        let first = fetcher.fetch("https://cdn/x.mp3", "title.mp3").await.unwrap();
        let second = fetcher.fetch("https://cdn/x.mp3", "title.mp3").await.unwrap();

        assert_eq!(http.gets.load(Ordering::SeqCst), 1);
        assert_eq!(first.path, second.path);
        assert!(first.written);
        assert!(!second.written);
    }

    #[tokio::test]
    async fn existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("title.mp3");
        std::fs::write(&path, b"stale").unwrap();

        let http = CountingHttp::new();
        let outcome = ContentFetcher::new(&http, dir.path())
            .fetch("https://cdn/x.mp3", "title.mp3")
            .await
            .unwrap();

        assert!(!outcome.written);
        assert_eq!(std::fs::read(&path).unwrap(), b"stale");
        assert_eq!(http.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_sanitizes_target_name() {
        let dir = tempfile::tempdir().unwrap();
        let http = CountingHttp::new();
        let outcome = ContentFetcher::new(&http, dir.path())
            .fetch("https://cdn/x.mp3", "a:b c?.mp3")
            .await
            .unwrap();
        assert_eq!(outcome.path, dir.path().join("ab_c.mp3"));
    }

    #[tokio::test]
    async fn failed_get_is_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let http = CountingHttp {
            gets: AtomicUsize::new(0),
            fail: true,
        };
        let err = ContentFetcher::new(&http, dir.path())
            .fetch("https://cdn/missing.jpg", "1_title.jpg")
            .await
            .unwrap_err();

        assert_eq!(err.file_name, "1_title.jpg");
        assert_eq!(err.url, "https://cdn/missing.jpg");
        assert!(matches!(err.source, FetchFailure::Http(_)));
        assert!(!dir.path().join("1_title.jpg").exists());
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("deeper");
        let http = CountingHttp::new();
        let outcome = ContentFetcher::new(&http, &nested)
            .fetch("https://cdn/x.jpg", "1_x.jpg")
            .await
            .unwrap();
        assert!(outcome.path.exists());
    }
}
