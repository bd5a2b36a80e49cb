//! Variant extractors for TikTok pages.
//!
//! Each extractor drives a [`PageSession`] to find the media resources of one
//! content variant, saves them, and returns the variant's result. Reads of
//! optional metadata (author handle, music link, thumbnail) are best-effort:
//! a missing element is logged and the field is left empty.

pub mod music;
pub mod photo;
pub mod video;

use std::path::{Path, PathBuf};

use crate::core::error::ExtractError;
use crate::core::fetcher::ContentFetcher;
use crate::core::http_client::HttpClient;
use crate::core::session::PageSession;
use crate::core::url_parser::ParsedUrl;
use crate::models::media::WrittenFiles;
use crate::models::settings::AppSettings;

/// Everything one extraction call needs, borrowed from the orchestrator.
pub struct ExtractContext<'a, S: PageSession, H: HttpClient + ?Sized> {
    pub session: &'a mut S,
    pub http: &'a H,
    pub settings: &'a AppSettings,
    pub dir: &'a Path,
    pub page: &'a ParsedUrl,
    pub written: &'a mut WrittenFiles,
}

impl<'a, S: PageSession, H: HttpClient + ?Sized> ExtractContext<'a, S, H> {
    pub(crate) async fn wait(
        &mut self,
        selector: &str,
        step: &'static str,
    ) -> Result<S::Element, ExtractError> {
        let timeout = self.settings.browser.element_timeout();
        tracing::debug!("TikTok: waiting up to {:?} for {} ({})", timeout, step, selector);
        self.session
            .wait_for_element(selector, timeout)
            .await
            .map_err(ExtractError::page(step))
    }

    pub(crate) async fn attribute(
        &mut self,
        element: &S::Element,
        name: &str,
        step: &'static str,
    ) -> Result<Option<String>, ExtractError> {
        let value = self
            .session
            .read_attribute(element, name)
            .await
            .map_err(ExtractError::page(step))?;
        Ok(value.filter(|v| !v.trim().is_empty()))
    }

    /// Read a resource URL (`src`/`href`) that the step cannot do without.
    pub(crate) async fn required_url(
        &mut self,
        element: &S::Element,
        selector: &str,
        attribute: &'static str,
        step: &'static str,
    ) -> Result<String, ExtractError> {
        match self.attribute(element, attribute, step).await? {
            Some(value) => Ok(self.absolutize(&value)),
            None => Err(ExtractError::MissingAttribute {
                step,
                selector: selector.to_string(),
                attribute,
            }),
        }
    }

    pub(crate) async fn optional_text(&mut self, selector: &str, what: &str) -> Option<String> {
        let element = self.optional_element(selector, what).await?;
        match self.session.read_text(&element).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!("TikTok: {} is empty ({})", what, selector);
                None
            }
            Err(e) => {
                tracing::warn!("TikTok: could not read {}: {}", what, e);
                None
            }
        }
    }

    pub(crate) async fn optional_url(
        &mut self,
        selector: &str,
        attribute: &str,
        what: &str,
    ) -> Option<String> {
        let value = self.optional_attribute(selector, attribute, what).await?;
        Some(self.absolutize(&value))
    }

    pub(crate) async fn optional_attribute(
        &mut self,
        selector: &str,
        attribute: &str,
        what: &str,
    ) -> Option<String> {
        let element = self.optional_element(selector, what).await?;
        match self.session.read_attribute(&element, attribute).await {
            Ok(Some(value)) if !value.trim().is_empty() => Some(value),
            Ok(_) => {
                tracing::warn!("TikTok: {} has no {} attribute", what, attribute);
                None
            }
            Err(e) => {
                tracing::warn!("TikTok: could not read {}: {}", what, e);
                None
            }
        }
    }

    async fn optional_element(&mut self, selector: &str, what: &str) -> Option<S::Element> {
        match self.session.find_element(selector).await {
            Ok(Some(element)) => Some(element),
            Ok(None) => {
                tracing::warn!("TikTok: {} not found ({}), leaving it empty", what, selector);
                None
            }
            Err(e) => {
                tracing::warn!("TikTok: could not look up {}: {}", what, e);
                None
            }
        }
    }

    /// Fetch `url` into the download directory and journal the file if it is new.
    pub(crate) async fn fetch(&mut self, url: &str, file_name: &str) -> Result<PathBuf, ExtractError> {
        let outcome = ContentFetcher::new(self.http, self.dir)
            .fetch(url, file_name)
            .await?;
        if outcome.written {
            self.written.record(&outcome.path);
        }
        Ok(outcome.path)
    }

    /// Resolve a possibly relative `href`/`src` against the page URL.
    pub(crate) fn absolutize(&self, value: &str) -> String {
        absolutize(&self.page.url, value)
    }
}

pub(crate) fn absolutize(base: &str, value: &str) -> String {
    let value = value.trim();
    url::Url::parse(base)
        .and_then(|base| base.join(value))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| value.to_string())
}
