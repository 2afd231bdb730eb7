//! Presentation adapter: maps session state and assessments into view models.
//!
//! Purely derived data. Widget-local toggles (expanded bars, tooltips) belong
//! to the renderer and are not modelled here.

use serde::Serialize;

use crate::assessment::{
    Category, RiskAssessment, RiskConfig, RiskTier, ScoreBand, Tag, TagSeverity,
};
use crate::session::{ScanSession, SessionState};
use crate::signals::SignalBundle;
use crate::url::strip_scheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Scanning,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub phase: Phase,
    pub input: String,
    pub input_error: Option<String>,
    pub scanned_url: Option<String>,
    pub error: Option<String>,
    pub report: Option<ReportView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub final_url: String,
    pub score: Option<u8>,
    pub band: ScoreBand,
    pub tier: RiskTier,
    pub tier_label: String,
    pub narrative: String,
    pub threat_message: Option<String>,
    pub tags: Vec<Tag>,
    pub reasons: Vec<String>,
    pub categories: Vec<CategoryBar>,
    pub redirects: Vec<RedirectHop>,
    pub metadata: Vec<MetadataRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBar {
    pub key: &'static str,
    pub label: &'static str,
    pub score: Option<u8>,
    pub band: ScoreBand,
    pub factors: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectHop {
    pub domain: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRow {
    pub label: &'static str,
    pub value: String,
}

impl ScanSession {
    /// Render-ready snapshot of the whole dashboard.
    pub fn view(&self) -> DashboardView {
        let (phase, error, report) = match self.state() {
            SessionState::Idle => (Phase::Idle, None, None),
            SessionState::InFlight { .. } => (Phase::Scanning, None, None),
            SessionState::Succeeded {
                bundle, assessment, ..
            } => (
                Phase::Ready,
                None,
                Some(ReportView::new(bundle, assessment, self.config())),
            ),
            SessionState::Failed { failure, .. } => {
                (Phase::Failed, Some(failure.message.clone()), None)
            }
        };
        DashboardView {
            phase,
            input: self.input().to_string(),
            input_error: self.input_error().map(|err| err.to_string()),
            scanned_url: self.state().url().map(ToOwned::to_owned),
            error,
            report,
        }
    }
}

impl ReportView {
    pub fn new(bundle: &SignalBundle, assessment: &RiskAssessment, config: &RiskConfig) -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let score = assessment.category_scores.get(category);
                CategoryBar {
                    key: category.key(),
                    label: category.label(),
                    score,
                    band: ScoreBand::from_score_with_thresholds(score, &config.bands),
                    factors: category_factors(category, bundle, assessment, config),
                }
            })
            .collect();

        Self {
            final_url: bundle.final_url.clone(),
            score: assessment.overall_score,
            band: assessment.band(&config.bands),
            tier: assessment.tier,
            tier_label: config.tier_polarity.label(assessment.tier).to_string(),
            narrative: assessment.narrative.clone(),
            threat_message: assessment.threat_message.clone(),
            tags: assessment.tags.clone(),
            reasons: assessment.reasons.clone(),
            categories,
            redirects: redirect_hops(&bundle.redirect_chain),
            metadata: metadata_rows(bundle),
        }
    }
}

fn category_factors(
    category: Category,
    bundle: &SignalBundle,
    assessment: &RiskAssessment,
    config: &RiskConfig,
) -> Vec<Tag> {
    if category == Category::DomainTrust {
        return assessment.domain_factors.clone();
    }
    let Some(content) = bundle.content_signals.as_ref() else {
        return Vec::new();
    };
    match category {
        Category::Ssl if content.ssl_present => {
            vec![Tag::new("Served over HTTPS", TagSeverity::Positive)]
        }
        Category::Ssl => vec![Tag::new("No SSL/TLS encryption", TagSeverity::Negative)],
        Category::Content => {
            let login = if content.has_login_form {
                Tag::new("Credential form detected", TagSeverity::Negative)
            } else {
                Tag::new("No credential form", TagSeverity::Positive)
            };
            let scripts = content.third_party_script_count;
            let severity = if scripts > config.script_caution_above {
                TagSeverity::Negative
            } else {
                TagSeverity::Neutral
            };
            vec![login, Tag::new(format!("{scripts} third-party scripts"), severity)]
        }
        Category::Privacy if content.has_privacy_link => {
            vec![Tag::new("Privacy policy present", TagSeverity::Positive)]
        }
        Category::Privacy => vec![Tag::new("Privacy policy missing", TagSeverity::Negative)],
        Category::DomainTrust => Vec::new(),
    }
}

/// Every hop but the last is shown as a redirect.
pub fn redirect_hops(chain: &[String]) -> Vec<RedirectHop> {
    let last = chain.len().saturating_sub(1);
    chain
        .iter()
        .enumerate()
        .map(|(idx, url)| RedirectHop {
            domain: strip_scheme(url).to_string(),
            status_code: if idx < last { 302 } else { 200 },
        })
        .collect()
}

fn metadata_rows(bundle: &SignalBundle) -> Vec<MetadataRow> {
    let mut rows = vec![
        MetadataRow {
            label: "Final URL",
            value: bundle.final_url.clone(),
        },
        MetadataRow {
            label: "Redirects",
            value: bundle.redirect_chain.len().to_string(),
        },
    ];
    if let Some(content) = bundle.content_signals.as_ref() {
        rows.push(MetadataRow {
            label: "SSL",
            value: yes_no(content.ssl_present, "Yes", "No"),
        });
        rows.push(MetadataRow {
            label: "Third-party Scripts",
            value: content.third_party_script_count.to_string(),
        });
        rows.push(MetadataRow {
            label: "Privacy Policy",
            value: yes_no(content.has_privacy_link, "Found", "Not found"),
        });
    }
    if let Some(whois) = bundle.domain_registration.as_ref() {
        if !whois.registrar.trim().is_empty() {
            rows.push(MetadataRow {
                label: "Registrar",
                value: whois.registrar.trim().to_string(),
            });
        }
        if let Some(age) = whois.age_years {
            rows.push(MetadataRow {
                label: "Domain Age",
                value: format!("{age:.1} years"),
            });
        }
    }
    if let Some(authority) = bundle.domain_authority.as_ref() {
        let value = match (authority.score_decimal, authority.score_integer) {
            (Some(decimal), _) => Some(format!("{decimal:.2} / 10")),
            (None, Some(integer)) => Some(format!("{integer} / 10")),
            (None, None) => None,
        };
        if let Some(value) = value {
            rows.push(MetadataRow {
                label: "Domain Authority",
                value,
            });
        }
        if let Some(rank) = authority.rank_label.as_deref().filter(|r| !r.is_empty()) {
            rows.push(MetadataRow {
                label: "Global Rank",
                value: rank.to_string(),
            });
        }
    }
    rows
}

fn yes_no(flag: bool, yes: &str, no: &str) -> String {
    if flag { yes } else { no }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{update, Msg};
    use crate::signals::{ContentSignals, DomainAuthority};

    #[test]
    fn redirect_hops_mark_final_hop_ok() {
        let hops = redirect_hops(&[
            "http://bit.example/x".to_string(),
            "https://final.example/".to_string(),
        ]);
        assert_eq!(
            hops,
            vec![
                RedirectHop {
                    domain: "bit.example/x".into(),
                    status_code: 302
                },
                RedirectHop {
                    domain: "final.example/".into(),
                    status_code: 200
                },
            ]
        );
        assert!(redirect_hops(&[]).is_empty());
    }

    #[test]
    fn idle_view_has_no_report() {
        let view = ScanSession::new().view();
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.report.is_none());
        assert!(view.scanned_url.is_none());
    }

    #[test]
    fn validation_error_is_rendered_as_text() {
        let (session, _) = update(ScanSession::new(), Msg::Submit(String::new()));
        assert_eq!(
            session.view().input_error.as_deref(),
            Some("Please enter a URL to scan")
        );
    }

    #[test]
    fn ready_view_builds_bars_and_metadata() {
        let (session, _) = update(ScanSession::new(), Msg::Submit("example.com".into()));
        let bundle = SignalBundle {
            final_url: "https://example.com/".into(),
            content_signals: Some(ContentSignals {
                ssl_present: true,
                has_privacy_link: false,
                has_login_form: false,
                third_party_script_count: 2,
            }),
            domain_authority: Some(DomainAuthority {
                score_decimal: Some(6.5),
                score_integer: Some(7),
                rank_label: Some("1200".into()),
            }),
            ..SignalBundle::default()
        };
        let (session, _) = update(
            session,
            Msg::ScanSucceeded {
                request_id: 1,
                bundle: Box::new(bundle),
            },
        );

        let view = session.view();
        assert_eq!(view.phase, Phase::Ready);
        let report = view.report.unwrap();
        assert_eq!(report.band, ScoreBand::Inactive);
        assert_eq!(report.tier_label, "Unknown");
        let keys: Vec<_> = report.categories.iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["ssl", "domainTrust", "content", "privacy"]);
        assert_eq!(report.categories[0].band, ScoreBand::Safe);
        assert_eq!(report.categories[3].score, Some(30));
        assert_eq!(report.categories[3].band, ScoreBand::Danger);
        let labels: Vec<_> = report.metadata.iter().map(|row| row.label).collect();
        assert!(labels.contains(&"Domain Authority"));
        assert!(labels.contains(&"Global Rank"));
    }
}
