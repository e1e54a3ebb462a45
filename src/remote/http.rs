//! HttpFetcher - reqwest-backed fetch primitive.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use serde_json::Value;

use super::endpoints::join;
use super::Fetcher;
use crate::config::RemoteConfig;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    site_origin: Option<String>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| FetchError::Transport {
                url: String::new(),
                message: error.to_string(),
            })?;
        Ok(Self {
            client,
            site_origin: None,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, FetchError> {
        let fetcher = Self::new(config.timeout())?;
        Ok(match &config.site_origin {
            Some(origin) => fetcher.with_site_origin(origin),
            None => fetcher,
        })
    }

    /// Origin that site-relative URLs (`/assets/...`) are resolved against.
    pub fn with_site_origin(mut self, origin: &str) -> Self {
        self.site_origin = Some(origin.trim_end_matches('/').to_string());
        self
    }

    fn absolute(&self, url: &str) -> Result<String, FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.to_string());
        }
        match &self.site_origin {
            Some(origin) => Ok(join(origin, url)),
            None => Err(FetchError::Transport {
                url: url.to_string(),
                message: "relative URL and no site origin configured".into(),
            }),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let target = self.absolute(url)?;
        let transport = |error: reqwest::Error| FetchError::Transport {
            url: target.clone(),
            message: error.to_string(),
        };

        let response = self
            .client
            .get(&target)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|error| FetchError::Decode {
            url: target.clone(),
            message: error.to_string(),
        })
    }
}
