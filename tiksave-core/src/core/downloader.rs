use crate::core::error::Error;
use crate::core::http_client::HttpClient;
use crate::core::session::PageSession;
use crate::core::url_parser::{parse_url, ContentVariant};
use crate::models::media::{ExtractionResult, MediaRequest, WrittenFiles};
use crate::models::settings::{AppSettings, RollbackPolicy};
use crate::platforms::tiktok::{self, ExtractContext};

/// Runs one request end to end: resolve, classify, extract, release the session.
pub struct Downloader<H: HttpClient> {
    http: H,
    settings: AppSettings,
}

impl<H: HttpClient> Downloader<H> {
    pub fn new(http: H, settings: AppSettings) -> Self {
        Self { http, settings }
    }

    /// Download the media behind `request.source_url` using `session`.
    ///
    /// The session is closed exactly once before this returns, whatever the
    /// outcome.
    pub async fn download<S: PageSession>(
        &self,
        request: &MediaRequest,
        session: Option<S>,
    ) -> Result<ExtractionResult, Error> {
        let source_url = request.source_url.trim();
        if source_url.is_empty() {
            if let Some(mut session) = session {
                close_session(&mut session).await;
            }
            return Err(Error::UrlNotProvided);
        }
        let Some(mut session) = session else {
            return Err(Error::SessionNotInitialized);
        };

        let result = self.run(request, source_url, &mut session).await;
        close_session(&mut session).await;
        result
    }

    async fn run<S: PageSession>(
        &self,
        request: &MediaRequest,
        source_url: &str,
        session: &mut S,
    ) -> Result<ExtractionResult, Error> {
        let resolved = self
            .http
            .resolve_redirect(source_url)
            .await
            .map_err(|source| Error::Network {
                url: source_url.to_string(),
                source,
            })?;
        tracing::debug!("resolved {} -> {}", source_url, resolved);

        let page = parse_url(&resolved).ok_or_else(|| Error::UnsupportedUrl(resolved.clone()))?;
        tracing::debug!(
            "detected {} content {} by {}",
            page.variant.type_name(),
            page.content_id,
            page.owner
        );

        let mut written = WrittenFiles::new();
        let outcome = {
            let mut ctx = ExtractContext {
                session,
                http: &self.http,
                settings: &self.settings,
                dir: &request.download_directory,
                page: &page,
                written: &mut written,
            };
            match page.variant {
                ContentVariant::Video => tiktok::video::extract(&mut ctx)
                    .await
                    .map(ExtractionResult::Video)
                    .map_err(Error::Video),
                ContentVariant::PhotoCarousel => tiktok::photo::extract(&mut ctx)
                    .await
                    .map(ExtractionResult::Photo)
                    .map_err(Error::Photo),
                ContentVariant::AudioTrack => tiktok::music::extract(&mut ctx)
                    .await
                    .map(ExtractionResult::Music)
                    .map_err(Error::Music),
            }
        };

        match outcome {
            Ok(result) => {
                tracing::debug!(
                    "{} download finished with {} file(s)",
                    result.type_name(),
                    result.files().len()
                );
                Ok(result)
            }
            Err(e) => {
                self.roll_back(&mut written, &e).await;
                Err(e)
            }
        }
    }

    async fn roll_back(&self, written: &mut WrittenFiles, error: &Error) {
        if written.is_empty() {
            return;
        }
        match self.settings.download.rollback {
            RollbackPolicy::KeepPartial => {
                tracing::warn!(
                    "{} file(s) kept after failure: {}",
                    written.paths().len(),
                    error
                );
            }
            RollbackPolicy::RemoveWritten => {
                tracing::warn!(
                    "removing {} file(s) written before failure: {}",
                    written.paths().len(),
                    error
                );
                written.remove_all().await;
            }
        }
    }
}

async fn close_session<S: PageSession>(session: &mut S) {
    if let Err(e) = session.close().await {
        tracing::warn!("failed to close page session: {}", e);
    }
}

