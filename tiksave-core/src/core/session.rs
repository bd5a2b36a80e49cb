//! Page session capability.
//!
//! The extractors only ever talk to a rendered page through this trait, so
//! everything they do (sequencing, dedup, naming, error wrapping) is
//! independent of the browser engine behind it.

use async_trait::async_trait;
use std::time::Duration;

use crate::core::error::PageError;

#[async_trait]
pub trait PageSession: Send {
    /// Opaque handle to a DOM element found on the current page.
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> Result<(), PageError>;

    /// Block until `selector` matches at least one element or `timeout` passes.
    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, PageError>;

    /// Like [`wait_for_element`](Self::wait_for_element) but returns every match.
    async fn wait_for_all_elements(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Element>, PageError>;

    /// Immediate query, no waiting.
    async fn find_element(&mut self, selector: &str) -> Result<Option<Self::Element>, PageError>;

    /// Immediate query, no waiting. An empty vec is a valid answer.
    async fn find_all_elements(&mut self, selector: &str) -> Result<Vec<Self::Element>, PageError>;

    async fn read_attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, PageError>;

    async fn read_text(&mut self, element: &Self::Element) -> Result<String, PageError>;

    async fn run_script(&mut self, source: &str) -> Result<(), PageError>;

    /// Release every resource held by the session. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<(), PageError>;
}
