mod fixture;
mod http;
mod settings;

use async_trait::async_trait;
use thiserror::Error;

use crate::signals::SignalBundle;

pub use fixture::FixtureBackend;
pub use http::HttpBackend;
pub use settings::BackendSettings;

/// Failures reported by an analysis backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to reach analysis backend: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("backend returned an unreadable signal bundle: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read fixture {path}: {source}")]
    Fixture {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Message suitable for the user-facing failure state, when the backend
    /// supplied one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Status { message, .. } => Some(message.clone()),
            _ => None,
        }
    }
}

/// The analysis backend: inspects a URL and returns its signal bundle.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    async fn scan(&self, url: &str) -> Result<SignalBundle, BackendError>;
}
