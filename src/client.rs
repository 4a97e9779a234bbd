use std::time::Duration;

use log::debug;
use reqwest::Client;

use crate::{
    error::{Error, Result},
    models::{ModelList, ModelRecord},
};

pub const API_BASE: &str = "https://llm.chutes.ai/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ChutesClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl Default for ChutesClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChutesClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
        }
    }

    pub fn with_base_url<T: Into<String>>(mut self, base_url: T) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ChutesClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let http = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| Error::remote(&base_url, e))?;
        Ok(ChutesClient { base_url, http })
    }
}

/// Client for the inventory endpoint. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct ChutesClient {
    base_url: String,
    http: Client,
}

impl ChutesClient {
    pub fn new() -> Result<Self> {
        ChutesClientBuilder::new().build()
    }

    pub fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    pub async fn list_models(&self) -> Result<Vec<ModelRecord>> {
        let url = self.models_url();
        debug!("list_models: GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::remote(&url, e))?;
        let body = response.text().await.map_err(|e| Error::remote(&url, e))?;
        let list = ModelList::try_from(body.as_str()).map_err(|e| Error::remote(&url, e))?;

        debug!("  received {} models", list.data.len());
        Ok(list.data)
    }
}
