use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub mod engine;
pub mod tags;
pub mod threat;

pub use engine::{assess, assess_submission, assess_with_config};
pub use threat::{threat_display_name, threat_message};

/// Narrative shown when no upstream explanation is available.
pub const NO_DATA_NARRATIVE: &str = "No analysis summary is available for this URL.";

/// Coarse danger classification. `High` is the most dangerous tier under the
/// default polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Which end of the tier scale means "dangerous".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TierPolarity {
    #[default]
    HighIsDangerous,
    HighIsSafe,
}

impl TierPolarity {
    /// Tier forced onto a URL that appears on a threat list.
    pub fn most_dangerous(self) -> RiskTier {
        match self {
            Self::HighIsDangerous => RiskTier::High,
            Self::HighIsSafe => RiskTier::Low,
        }
    }

    /// User-facing label for a tier.
    pub fn label(self, tier: RiskTier) -> &'static str {
        match (self, tier) {
            (_, RiskTier::Unknown) => "Unknown",
            (_, RiskTier::Medium) => "Moderate",
            (Self::HighIsDangerous, RiskTier::High) | (Self::HighIsSafe, RiskTier::Low) => {
                "Dangerous"
            }
            (Self::HighIsDangerous, RiskTier::Low) | (Self::HighIsSafe, RiskTier::High) => "Safe",
        }
    }
}

/// Visual severity of a tag or factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSeverity {
    Positive,
    Caution,
    Negative,
    Neutral,
}

/// Short labelled observation used for quick visual scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    pub severity: TagSeverity,
}

impl Tag {
    pub fn new(label: impl Into<String>, severity: TagSeverity) -> Self {
        Self {
            label: label.into(),
            severity,
        }
    }
}

/// Sub-score categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Ssl,
    Content,
    Privacy,
    DomainTrust,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Ssl,
        Category::DomainTrust,
        Category::Content,
        Category::Privacy,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Ssl => "ssl",
            Self::Content => "content",
            Self::Privacy => "privacy",
            Self::DomainTrust => "domainTrust",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ssl => "SSL / TLS",
            Self::Content => "Content Safety",
            Self::Privacy => "Privacy",
            Self::DomainTrust => "Domain Trust",
        }
    }
}

/// Per-category sub-scores (0–100); `None` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub ssl: Option<u8>,
    pub content: Option<u8>,
    pub privacy: Option<u8>,
    pub domain_trust: Option<u8>,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> Option<u8> {
        match category {
            Category::Ssl => self.ssl,
            Category::Content => self.content,
            Category::Privacy => self.privacy,
            Category::DomainTrust => self.domain_trust,
        }
    }
}

/// Normalized verdict derived from a `SignalBundle`. Recomputed, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub overall_score: Option<u8>,
    pub tier: RiskTier,
    pub category_scores: CategoryScores,
    pub tags: Vec<Tag>,
    pub narrative: String,
    /// Explanatory reasons; upstream ones when supplied, local heuristics otherwise.
    pub reasons: Vec<String>,
    /// Labelled WHOIS factors behind the domain-trust score.
    pub domain_factors: Vec<Tag>,
    /// Present only when the URL is on a threat list.
    pub threat_message: Option<String>,
}

impl RiskAssessment {
    pub fn band(&self, thresholds: &BandThresholds) -> ScoreBand {
        ScoreBand::from_score_with_thresholds(self.overall_score, thresholds)
    }
}

/// Colour band shared by the score ring and the category bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Safe,
    Caution,
    Danger,
    /// Unknown score; rendered inactive, never as danger.
    Inactive,
}

impl ScoreBand {
    pub fn from_score(score: Option<u8>) -> Self {
        Self::from_score_with_thresholds(score, &BandThresholds::default())
    }

    pub fn from_score_with_thresholds(score: Option<u8>, thresholds: &BandThresholds) -> Self {
        match score {
            None => Self::Inactive,
            Some(score) if score >= thresholds.safe => Self::Safe,
            Some(score) if score >= thresholds.caution => Self::Caution,
            Some(_) => Self::Danger,
        }
    }
}

/// Lower bounds of the safe and caution bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub safe: u8,
    pub caution: u8,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            safe: 61,
            caution: 31,
        }
    }
}

/// Weights for the locally derived content sub-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentWeights {
    pub base: i32,
    pub login_penalty: i32,
    pub per_script_penalty: i32,
    pub script_penalty_cap: i32,
    /// Third-party scripts tolerated before the per-script penalty applies.
    pub free_scripts: u32,
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            base: 80,
            login_penalty: 30,
            per_script_penalty: 3,
            script_penalty_cap: 30,
            free_scripts: 2,
        }
    }
}

/// Weights for the WHOIS-driven domain-trust sub-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainTrustWeights {
    pub base: i32,
    pub established_bonus: i32,
    pub new_domain_penalty: i32,
    pub stale_update_penalty: i32,
    pub private_registration_penalty: i32,
    pub established_years: f64,
    pub new_domain_years: f64,
    pub stale_update_days: i64,
}

impl Default for DomainTrustWeights {
    fn default() -> Self {
        Self {
            base: 50,
            established_bonus: 20,
            new_domain_penalty: 25,
            stale_update_penalty: 0,
            private_registration_penalty: 0,
            established_years: 2.0,
            new_domain_years: 1.0,
            stale_update_days: 365,
        }
    }
}

/// Tunable configuration for the risk normalization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub bands: BandThresholds,
    pub content: ContentWeights,
    pub domain_trust: DomainTrustWeights,
    pub ssl_present_score: u8,
    pub ssl_missing_score: u8,
    pub privacy_link_score: u8,
    pub privacy_missing_score: u8,
    /// Script counts above this are tagged as caution.
    pub script_caution_above: u32,
    /// Script counts above this are tagged as negative.
    pub script_negative_above: u32,
    pub safe_tlds: BTreeSet<String>,
    pub tier_polarity: TierPolarity,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            bands: BandThresholds::default(),
            content: ContentWeights::default(),
            domain_trust: DomainTrustWeights::default(),
            ssl_present_score: 80,
            ssl_missing_score: 20,
            privacy_link_score: 70,
            privacy_missing_score: 30,
            script_caution_above: 5,
            script_negative_above: 10,
            safe_tlds: ["com", "org", "edu", "gov", "net"]
                .into_iter()
                .map(String::from)
                .collect(),
            tier_polarity: TierPolarity::default(),
        }
    }
}

impl RiskConfig {
    pub fn is_safe_tld(&self, tld: &str) -> bool {
        let tld = tld.trim().trim_start_matches('.').to_ascii_lowercase();
        self.safe_tlds.contains(&tld)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_thresholds_match_ring_and_bar() {
        assert_eq!(ScoreBand::from_score(Some(100)), ScoreBand::Safe);
        assert_eq!(ScoreBand::from_score(Some(61)), ScoreBand::Safe);
        assert_eq!(ScoreBand::from_score(Some(60)), ScoreBand::Caution);
        assert_eq!(ScoreBand::from_score(Some(31)), ScoreBand::Caution);
        assert_eq!(ScoreBand::from_score(Some(30)), ScoreBand::Danger);
        assert_eq!(ScoreBand::from_score(Some(0)), ScoreBand::Danger);
    }

    #[test]
    fn unknown_score_is_never_danger() {
        assert_eq!(ScoreBand::from_score(None), ScoreBand::Inactive);
    }

    #[test]
    fn polarity_labels() {
        let default = TierPolarity::default();
        assert_eq!(default.most_dangerous(), RiskTier::High);
        assert_eq!(default.label(RiskTier::High), "Dangerous");
        assert_eq!(default.label(RiskTier::Low), "Safe");
        assert_eq!(TierPolarity::HighIsSafe.label(RiskTier::High), "Safe");
        assert_eq!(TierPolarity::HighIsSafe.most_dangerous(), RiskTier::Low);
        assert_eq!(default.label(RiskTier::Unknown), "Unknown");
    }

    #[test]
    fn safe_tld_lookup_ignores_case_and_dot() {
        let config = RiskConfig::default();
        assert!(config.is_safe_tld("COM"));
        assert!(config.is_safe_tld(".org"));
        assert!(!config.is_safe_tld("xyz"));
    }

    #[test]
    fn risk_config_deserializes_partial_overrides() {
        let config: RiskConfig = serde_json::from_value(serde_json::json!({
            "domain_trust": { "established_bonus": 30 },
            "tier_polarity": "high_is_safe"
        }))
        .unwrap();
        assert_eq!(config.domain_trust.established_bonus, 30);
        assert_eq!(config.domain_trust.base, 50);
        assert_eq!(config.tier_polarity, TierPolarity::HighIsSafe);
        assert_eq!(config.bands, BandThresholds::default());
    }
}
