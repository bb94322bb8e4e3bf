use super::{extract_records, RoundFeed};
use crate::config::FeedConfig;
use crate::errors::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub struct HttpFeed {
    pub name: String,
    pub url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(name: String, url: String, timeout_ms: u64) -> Self {
        Self {
            name,
            url,
            timeout_ms,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(feed: &FeedConfig, timeout_ms: u64) -> Self {
        Self::new(feed.name.clone(), feed.url.clone(), timeout_ms)
    }

    fn map_err(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else if e.is_decode() {
            FetchError::Decode {
                message: e.to_string(),
            }
        } else {
            FetchError::Transport {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl RoundFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| self.map_err(e))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
            });
        }

        let payload: Value = resp.json().await.map_err(|e| self.map_err(e))?;
        extract_records(payload)
    }

    fn feed_name(&self) -> &str {
        &self.name
    }
}
