use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure reported by a [`PageSession`](crate::core::session::PageSession) implementation.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    Timeout { selector: String, timeout: Duration },
    #[error("no element matches `{0}`")]
    ElementNotFound(String),
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("script execution failed: {0}")]
    Script(String),
    #[error("page session is closed")]
    Closed,
    #[error("browser error: {0}")]
    Backend(String),
}

/// Failure reported by an [`HttpClient`](crate::core::http_client::HttpClient).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A single resource could not be fetched or written.
#[derive(Debug, Error)]
#[error("failed to download {file_name} from {url}: {source}")]
pub struct DownloadError {
    pub file_name: String,
    pub url: String,
    #[source]
    pub source: FetchFailure,
}

/// Low-level cause carried by the variant-scoped errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{step}: {source}")]
    Page {
        step: &'static str,
        #[source]
        source: PageError,
    },
    #[error("{step}: `{selector}` has no `{attribute}` attribute")]
    MissingAttribute {
        step: &'static str,
        selector: String,
        attribute: &'static str,
    },
    #[error("{step}: could not parse {value:?}")]
    Parse { step: &'static str, value: String },
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("{file_name} did not appear in {} within {timeout:?}", .dir.display())]
    DownloadTimeout {
        file_name: String,
        dir: PathBuf,
        timeout: Duration,
    },
}

impl ExtractError {
    pub(crate) fn page(step: &'static str) -> impl FnOnce(PageError) -> Self {
        move |source| Self::Page { step, source }
    }
}

/// Externally visible failure of a single `download()` call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to initialize page session: {0}")]
    SessionInitialization(String),
    #[error("no URL was provided")]
    UrlNotProvided,
    #[error("page session is not initialized")]
    SessionNotInitialized,
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),
    #[error("could not resolve {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: HttpError,
    },
    #[error("video download failed: {0}")]
    Video(#[source] ExtractError),
    #[error("photo download failed: {0}")]
    Photo(#[source] ExtractError),
    #[error("music download failed: {0}")]
    Music(#[source] ExtractError),
}

impl Error {
    /// The underlying extraction cause, if this is a variant-scoped failure.
    pub fn extract_cause(&self) -> Option<&ExtractError> {
        match self {
            Self::Video(e) | Self::Photo(e) | Self::Music(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_download_timeout(&self) -> bool {
        matches!(
            self.extract_cause(),
            Some(ExtractError::DownloadTimeout { .. })
        )
    }
}
