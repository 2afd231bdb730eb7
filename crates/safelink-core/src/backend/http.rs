use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use super::{BackendError, BackendSettings, ScanBackend};
use crate::signals::SignalBundle;

const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Client for the analysis backend's preview endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
    max_retries: u32,
}

impl HttpBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("safelink/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout_duration()?)
            .build()
            .context("failed to build backend HTTP client")?;
        Ok(Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            max_retries: settings.max_retries,
        })
    }

    fn preview_url(&self) -> String {
        format!("{}/api/preview", self.base_url)
    }

    /// Probe the backend's health endpoint.
    pub async fn health(&self) -> Result<(), BackendError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}

#[async_trait]
impl ScanBackend for HttpBackend {
    #[instrument(name = "backend_scan", skip(self))]
    async fn scan(&self, url: &str) -> Result<SignalBundle, BackendError> {
        let payload = PreviewRequest { url };
        let mut attempt = 0u32;
        let mut backoff = Duration::from_millis(200);
        loop {
            let result = self.http.post(self.preview_url()).json(&payload).send().await;

            let retryable = match &result {
                Ok(response) => response.status().is_server_error(),
                Err(_) => true,
            };
            if retryable && attempt < self.max_retries {
                warn!(attempt, "backend call failed; retrying");
                sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                attempt += 1;
                continue;
            }

            let response = result?;
            if !response.status().is_success() {
                return Err(status_error(response).await);
            }
            let body = response.text().await?;
            let bundle = SignalBundle::from_json(&body)?;
            debug!(final_url = %bundle.final_url, "backend returned bundle");
            return Ok(bundle);
        }
    }
}

async fn status_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorPayload>(&body)
        .ok()
        .and_then(ErrorPayload::into_message)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

#[derive(Serialize)]
struct PreviewRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorPayload {
    fn into_message(self) -> Option<String> {
        let detail = match self.detail {
            Some(serde_json::Value::String(text)) => Some(text),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        detail
            .or(self.message)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}
