use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{BackendError, ScanBackend};
use crate::signals::SignalBundle;

/// Offline backend that answers every scan with a bundle read from disk.
#[derive(Debug, Clone)]
pub struct FixtureBackend {
    path: PathBuf,
}

impl FixtureBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScanBackend for FixtureBackend {
    async fn scan(&self, url: &str) -> Result<SignalBundle, BackendError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| BackendError::Fixture {
                path: self.path.display().to_string(),
                source,
            })?;
        let mut bundle = SignalBundle::from_json(&raw)?;
        if bundle.final_url.is_empty() {
            bundle.final_url = url.to_string();
        }
        debug!(path = %self.path.display(), "served fixture bundle");
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn serves_bundle_and_fills_final_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"contentSignals": {{"sslPresent": true, "hasPrivacyLink": true,
                "hasLoginForm": false, "thirdPartyScriptCount": 2}}}}"#
        )
        .unwrap();

        let backend = FixtureBackend::new(file.path());
        let bundle = backend.scan("https://example.com").await.unwrap();
        assert_eq!(bundle.final_url, "https://example.com");
        assert!(bundle.content_signals.is_some());
    }

    #[tokio::test]
    async fn missing_fixture_is_an_error() {
        let backend = FixtureBackend::new("/definitely/not/here.json");
        let err = backend.scan("https://example.com").await.unwrap_err();
        assert!(matches!(err, BackendError::Fixture { .. }));
    }
}
