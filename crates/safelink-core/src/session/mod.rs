//! Scan session controller: a pure state machine driving one scan at a time.
mod update;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assessment::{RiskAssessment, RiskConfig};
use crate::signals::SignalBundle;
use crate::url::UrlError;

pub use update::update;

/// Monotonically increasing identifier of a dispatched scan.
pub type RequestId = u64;

/// Generic message used when the backend gives no usable explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Scan failed";

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL input; clears any validation error.
    InputChanged(String),
    /// User asked to scan the given raw text.
    Submit(String),
    /// Backend returned a bundle for `request_id`.
    ScanSucceeded {
        request_id: RequestId,
        bundle: Box<SignalBundle>,
    },
    /// Backend call for `request_id` failed.
    ScanFailed {
        request_id: RequestId,
        message: Option<String>,
    },
    /// Discard the session and return to idle.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send `url` to the analysis backend, tagged with `request_id`.
    DispatchScan { request_id: RequestId, url: String },
    /// The call for `request_id` was superseded; its result will be ignored.
    AbandonScan { request_id: RequestId },
}

/// Terminal backend failure surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ScanFailure {
    pub message: String,
}

impl ScanFailure {
    pub fn from_backend(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE);
        Self {
            message: message.to_string(),
        }
    }
}

/// Lifecycle of the current scan. Validation is synchronous and has no state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    InFlight {
        request_id: RequestId,
        url: String,
    },
    Succeeded {
        request_id: RequestId,
        url: String,
        bundle: Box<SignalBundle>,
        assessment: Box<RiskAssessment>,
    },
    Failed {
        request_id: RequestId,
        url: String,
        failure: ScanFailure,
    },
}

impl SessionState {
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Idle => None,
            Self::InFlight { request_id, .. }
            | Self::Succeeded { request_id, .. }
            | Self::Failed { request_id, .. } => Some(*request_id),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::InFlight { url, .. } | Self::Succeeded { url, .. } | Self::Failed { url, .. } => {
                Some(url.as_str())
            }
        }
    }
}

/// The single mutable unit of state: current session plus input-box state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanSession {
    state: SessionState,
    last_request_id: RequestId,
    input: String,
    input_error: Option<UrlError>,
    config: RiskConfig,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RiskConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Transient validation error attached to the input, if any.
    pub fn input_error(&self) -> Option<UrlError> {
        self.input_error
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, SessionState::InFlight { .. })
    }

    /// Id of the request whose outcome is currently authoritative.
    pub fn current_request_id(&self) -> Option<RequestId> {
        self.state.request_id()
    }

    pub fn bundle(&self) -> Option<&SignalBundle> {
        match &self.state {
            SessionState::Succeeded { bundle, .. } => Some(bundle.as_ref()),
            _ => None,
        }
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match &self.state {
            SessionState::Succeeded { assessment, .. } => Some(assessment.as_ref()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ScanFailure> {
        match &self.state {
            SessionState::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }

    fn allocate_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }
}
