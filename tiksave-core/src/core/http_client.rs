use async_trait::async_trait;
use std::time::Duration;

use crate::core::error::HttpError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";
const REFERER: &str = "https://www.tiktok.com/";

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` following redirects and return the final location.
    async fn resolve_redirect(&self, url: &str) -> Result<String, HttpError>;
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError>;
}

pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn resolve_redirect(&self, url: &str) -> Result<String, HttpError> {
        let response = self.client.get(url).send().await?;
        let final_url = response.url().to_string();
        if final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }
        Ok(final_url)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, REFERER)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!("fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
