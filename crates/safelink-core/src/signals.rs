//! Signal Bundle: the evidence the analysis backend returns for one URL.
//!
//! Every optional section may be absent or `null`; both mean "unknown". Field
//! names follow the canonical camelCase contract, with aliases for the legacy
//! preview endpoint so either shape deserializes into the same value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::assessment::RiskTier;

/// Backend output for a single scan. Immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalBundle {
    /// URL after following all redirects.
    #[serde(default, deserialize_with = "null_as_default")]
    pub final_url: String,
    /// Intermediate URLs visited on the way to `final_url`.
    #[serde(default, alias = "redirects", deserialize_with = "null_as_default")]
    pub redirect_chain: Vec<String>,
    #[serde(default, alias = "signals", deserialize_with = "lenient_section")]
    pub content_signals: Option<ContentSignals>,
    #[serde(default, alias = "whois", deserialize_with = "lenient_section")]
    pub domain_registration: Option<DomainRegistration>,
    #[serde(default, alias = "safeBrowsing", deserialize_with = "lenient_section")]
    pub threat_listing: Option<ThreatListing>,
    #[serde(default, alias = "pageRank", deserialize_with = "lenient_section")]
    pub domain_authority: Option<DomainAuthority>,
    #[serde(default, alias = "risk", deserialize_with = "lenient_section")]
    pub backend_verdict: Option<BackendVerdict>,
}

impl SignalBundle {
    /// Parse a bundle from the JSON body returned by the backend.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// True when no section carries any evidence at all.
    pub fn is_empty(&self) -> bool {
        self.content_signals.is_none()
            && self.domain_registration.is_none()
            && self.threat_listing.is_none()
            && self.domain_authority.is_none()
            && self.backend_verdict.is_none()
    }
}

/// Page-level observations captured during sandboxed navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSignals {
    #[serde(alias = "ssl")]
    pub ssl_present: bool,
    pub has_privacy_link: bool,
    pub has_login_form: bool,
    #[serde(alias = "thirdPartyScriptsCount")]
    pub third_party_script_count: u32,
}

/// WHOIS facts about the final domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRegistration {
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub registrar: String,
    #[serde(default, alias = "domainAgeYears")]
    pub age_years: Option<f64>,
    #[serde(default)]
    pub days_since_last_update: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tld: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub private_registration: bool,
}

/// Result of the malware/phishing list lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatListing {
    #[serde(default, alias = "is_flagged", deserialize_with = "null_as_default")]
    pub flagged: bool,
    /// Threat kinds such as `MALWARE` or `SOCIAL_ENGINEERING`.
    #[serde(default, alias = "threat_types", deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
}

/// Domain-authority lookup (PageRank style).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainAuthority {
    #[serde(default, alias = "pageRankDecimal")]
    pub score_decimal: Option<f64>,
    #[serde(default, alias = "pageRankInteger")]
    pub score_integer: Option<i64>,
    #[serde(default, alias = "rank")]
    pub rank_label: Option<String>,
}

/// Risk judgment already computed upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendVerdict {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub tier: Option<RiskTier>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasons: Vec<String>,
    #[serde(default, alias = "reasoning")]
    pub narrative: Option<String>,
    #[serde(default)]
    pub domain_trust_score: Option<f64>,
}

/// A section that fails to decode is treated as absent instead of failing the
/// whole bundle.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(section) => Ok(Some(section)),
        Err(err) => {
            debug!(error = %err, "ignoring malformed signal section");
            Ok(None)
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
