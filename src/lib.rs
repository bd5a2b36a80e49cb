use tiksave_core::{Downloader, Error, ExtractionResult, MediaRequest, ReqwestHttpClient};

pub mod commands;
pub mod core;
pub mod storage;

pub use tiksave_core::AppSettings;

use crate::core::browser::ChromiumSession;

/// Install the fmt subscriber. `debug` raises the level from WARN to DEBUG.
pub fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open a Chromium session on `request.source_url` and run the download.
///
/// `request.debug_enabled` only makes the browser window visible. Log output
/// is whatever subscriber the caller installed, see [`init_logging`].
pub async fn download(
    request: &MediaRequest,
    settings: AppSettings,
) -> Result<ExtractionResult, Error> {
    if request.source_url.trim().is_empty() {
        return Err(Error::UrlNotProvided);
    }

    let session = ChromiumSession::launch(
        request.source_url.trim(),
        &request.download_directory,
        request.debug_enabled,
        &settings.browser,
    )
    .await
    .map_err(|e| Error::SessionInitialization(e.to_string()))?;

    Downloader::new(ReqwestHttpClient::new(), settings)
        .download(request, Some(session))
        .await
}
