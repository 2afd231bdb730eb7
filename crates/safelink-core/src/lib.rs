pub mod assessment;
pub mod backend;
pub mod report;
pub mod runtime;
pub mod session;
pub mod signals;
pub mod url;
pub mod view;

pub use assessment::{
    assess, assess_submission, assess_with_config, Category, RiskAssessment, RiskConfig,
    RiskTier, ScoreBand, Tag, TagSeverity, TierPolarity,
};
pub use backend::{BackendError, BackendSettings, FixtureBackend, HttpBackend, ScanBackend};
pub use report::{render_dashboard, render_report, OutputFormat};
pub use runtime::ScanRunner;
pub use session::{update, Effect, Msg, ScanFailure, ScanSession, SessionState};
pub use signals::SignalBundle;
pub use crate::url::{normalize_url, UrlError};
pub use view::{DashboardView, Phase, ReportView};
