//! InMemoryFetcher - canned responses keyed by URL.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::Fetcher;
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum CannedResponse {
    Json(Value),
    Status(u16),
    /// A successful response whose body is not JSON.
    Body(String),
    /// The connection fails before any response.
    Unreachable,
}

/// Fetcher answering from a table. Unknown URLs answer 404. Every request is
/// recorded, in order.
///
/// Clone-friendly via Arc; clones share routes and the request log.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFetcher {
    routes: Arc<RwLock<HashMap<String, CannedResponse>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, response: CannedResponse) -> Self {
        self.set_route(url, response);
        self
    }

    pub fn with_json(self, url: impl Into<String>, body: Value) -> Self {
        self.route(url, CannedResponse::Json(body))
    }

    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.route(url, CannedResponse::Status(status))
    }

    /// Replace the response for `url`.
    pub fn set_route(&self, url: impl Into<String>, response: CannedResponse) {
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), response);
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Fetcher for InMemoryFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        let response = self
            .routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .unwrap_or(CannedResponse::Status(404));

        match response {
            CannedResponse::Json(body) => Ok(body),
            CannedResponse::Status(status) if (200..300).contains(&status) => Ok(Value::Null),
            CannedResponse::Status(status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            CannedResponse::Body(body) => {
                serde_json::from_str(&body).map_err(|error| FetchError::Decode {
                    url: url.to_string(),
                    message: error.to_string(),
                })
            }
            CannedResponse::Unreachable => Err(FetchError::Transport {
                url: url.to_string(),
                message: "connection refused".into(),
            }),
        }
    }
}
