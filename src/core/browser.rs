use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use tiksave_core::models::settings::BrowserSettings;
use tiksave_core::{PageError, PageSession};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chromium page driven over CDP.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
}

impl ChromiumSession {
    /// Launch a browser that saves downloads into `download_dir` and open `url`.
    pub async fn launch(
        url: &str,
        download_dir: &Path,
        headed: bool,
        settings: &BrowserSettings,
    ) -> Result<Self, PageError> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--mute-audio")
            .arg("--disable-dev-shm-usage");
        if headed {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        for arg in &settings.extra_args {
            builder = builder.arg(arg.as_str());
        }
        let config = builder.build().map_err(PageError::Backend)?;

        let (mut browser, mut handler) = Browser::launch(config).await.map_err(backend)?;
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        tracing::debug!("browser started (headed: {})", headed);

        match Self::open(&browser, url, download_dir, settings).await {
            Ok(page) => Ok(Self {
                browser: Some(browser),
                page: Some(page),
                handler: Some(handler),
                navigation_timeout: settings.navigation_timeout(),
            }),
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                Err(e)
            }
        }
    }

    async fn open(
        browser: &Browser,
        url: &str,
        download_dir: &Path,
        settings: &BrowserSettings,
    ) -> Result<Page, PageError> {
        let behavior = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(download_dir.display().to_string())
            .build()
            .map_err(PageError::Backend)?;
        browser.execute(behavior).await.map_err(backend)?;

        let page = tokio::time::timeout(settings.navigation_timeout(), browser.new_page(url))
            .await
            .map_err(|_| PageError::Navigation {
                url: url.to_string(),
                message: format!("timed out after {:?}", settings.navigation_timeout()),
            })?
            .map_err(|e| PageError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!("opened {}", url);
        Ok(page)
    }

    fn page(&self) -> Result<&Page, PageError> {
        self.page.as_ref().ok_or(PageError::Closed)
    }
}

fn backend(e: impl std::fmt::Display) -> PageError {
    PageError::Backend(e.to_string())
}

#[async_trait]
impl PageSession for ChromiumSession {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        let page = self.page()?;
        let navigation = tokio::time::timeout(self.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| PageError::Navigation {
                url: url.to_string(),
                message: format!("timed out after {:?}", self.navigation_timeout),
            })?;
        navigation.map_err(|e| PageError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!("navigated to {}", url);
        Ok(())
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, PageError> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = page.find_element(selector).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(PageError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_all_elements(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Element>, PageError> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;
        loop {
            match page.find_elements(selector).await {
                Ok(elements) if !elements.is_empty() => return Ok(elements),
                _ => {}
            }
            if Instant::now() >= deadline {
                return Err(PageError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_element(&mut self, selector: &str) -> Result<Option<Element>, PageError> {
        let page = self.page()?;
        match page.find_element(selector).await {
            Ok(element) => Ok(Some(element)),
            Err(e) => {
                tracing::debug!("no match for {}: {}", selector, e);
                Ok(None)
            }
        }
    }

    async fn find_all_elements(&mut self, selector: &str) -> Result<Vec<Element>, PageError> {
        let page = self.page()?;
        match page.find_elements(selector).await {
            Ok(elements) => Ok(elements),
            Err(e) => {
                tracing::debug!("no match for {}: {}", selector, e);
                Ok(Vec::new())
            }
        }
    }

    async fn read_attribute(
        &mut self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        element.attribute(name).await.map_err(backend)
    }

    async fn read_text(&mut self, element: &Element) -> Result<String, PageError> {
        let text = element.inner_text().await.map_err(backend)?;
        Ok(text.unwrap_or_default())
    }

    async fn run_script(&mut self, source: &str) -> Result<(), PageError> {
        let page = self.page()?;
        page.evaluate(source)
            .await
            .map_err(|e| PageError::Script(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), PageError> {
        self.page = None;
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser.close().await.map(|_| ()).map_err(backend);
        if let Err(e) = browser.wait().await {
            tracing::debug!("browser process did not exit cleanly: {}", e);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        tracing::debug!("browser closed");
        closed
    }
}
