use tracing::{debug, instrument, trace};

use super::{
    tags::derive_tags, threat::threat_message, CategoryScores, RiskAssessment, RiskConfig,
    RiskTier, Tag, TagSeverity, NO_DATA_NARRATIVE,
};
use crate::signals::{ContentSignals, DomainRegistration, SignalBundle};
use crate::url::host_of;

const SUSPICIOUS_TLDS: [&str; 8] = ["xyz", "top", "click", "buzz", "tk", "ml", "ga", "cf"];
const LONG_REDIRECT_HOPS: usize = 3;
const NESTED_SUBDOMAIN_LABELS: usize = 3;

/// Assess a bundle with the default configuration.
pub fn assess(bundle: &SignalBundle) -> RiskAssessment {
    assess_with_config(bundle, &RiskConfig::default())
}

/// Turn a possibly partial `SignalBundle` into a `RiskAssessment`.
///
/// Total: missing inputs become unknown outputs. An upstream verdict is
/// passed through as-is; local derivation only fills the gaps it leaves.
pub fn assess_with_config(bundle: &SignalBundle, config: &RiskConfig) -> RiskAssessment {
    assess_submission(bundle, None, config)
}

/// Like [`assess_with_config`], with the URL the user submitted. The
/// submitted host is compared against the final host; without it the first
/// redirect hop stands in.
#[instrument(name = "assess_bundle", skip_all, fields(final_url = %bundle.final_url))]
pub fn assess_submission(
    bundle: &SignalBundle,
    submitted_url: Option<&str>,
    config: &RiskConfig,
) -> RiskAssessment {
    let verdict = bundle.backend_verdict.as_ref();

    let overall_score = verdict.and_then(|v| v.score).and_then(to_score);
    let tier = resolve_tier(bundle, config);
    let narrative = verdict
        .and_then(|v| v.narrative.clone())
        .unwrap_or_else(|| NO_DATA_NARRATIVE.to_string());

    let (domain_trust, domain_factors) = domain_trust(bundle, config);
    let content = bundle.content_signals.as_ref();
    let category_scores = CategoryScores {
        ssl: content.map(|c| ssl_score(c, config)),
        content: content.map(|c| content_score(c, config)),
        privacy: content.map(|c| privacy_score(c, config)),
        domain_trust,
    };

    let reasons = match verdict {
        Some(v) if !v.reasons.is_empty() => v.reasons.clone(),
        _ => heuristic_reasons(bundle, submitted_url, config),
    };

    let threat_message = bundle
        .threat_listing
        .as_ref()
        .filter(|listing| listing.flagged)
        .map(|listing| threat_message(&listing.categories));

    debug!(
        score = ?overall_score,
        ?tier,
        passthrough = verdict.is_some(),
        "bundle assessed"
    );

    RiskAssessment {
        overall_score,
        tier,
        category_scores,
        tags: derive_tags(bundle, config),
        narrative,
        reasons,
        domain_factors,
        threat_message,
    }
}

fn resolve_tier(bundle: &SignalBundle, config: &RiskConfig) -> RiskTier {
    let upstream = bundle
        .backend_verdict
        .as_ref()
        .and_then(|v| v.tier)
        .filter(|tier| *tier != RiskTier::Unknown);
    if let Some(tier) = upstream {
        return tier;
    }
    let flagged = bundle
        .threat_listing
        .as_ref()
        .is_some_and(|listing| listing.flagged);
    if flagged {
        trace!("threat listing forces most dangerous tier");
        config.tier_polarity.most_dangerous()
    } else {
        RiskTier::Unknown
    }
}

pub(crate) fn ssl_score(content: &ContentSignals, config: &RiskConfig) -> u8 {
    if content.ssl_present {
        config.ssl_present_score
    } else {
        config.ssl_missing_score
    }
}

pub(crate) fn privacy_score(content: &ContentSignals, config: &RiskConfig) -> u8 {
    if content.has_privacy_link {
        config.privacy_link_score
    } else {
        config.privacy_missing_score
    }
}

pub(crate) fn content_score(content: &ContentSignals, config: &RiskConfig) -> u8 {
    let weights = &config.content;
    let login = if content.has_login_form {
        weights.login_penalty
    } else {
        0
    };
    let billable = content
        .third_party_script_count
        .saturating_sub(weights.free_scripts);
    let scripts = i64::from(billable)
        .saturating_mul(i64::from(weights.per_script_penalty))
        .min(i64::from(weights.script_penalty_cap));
    clamp_points(i64::from(weights.base) - i64::from(login) - scripts)
}

fn domain_trust(bundle: &SignalBundle, config: &RiskConfig) -> (Option<u8>, Vec<Tag>) {
    let upstream = bundle
        .backend_verdict
        .as_ref()
        .and_then(|v| v.domain_trust_score)
        .and_then(to_score);

    let Some(registration) = bundle.domain_registration.as_ref() else {
        let fallback = if bundle.is_empty() {
            None
        } else {
            Some(clamp_points(i64::from(config.domain_trust.base)))
        };
        return (upstream.or(fallback), Vec::new());
    };

    let (points, factors) = whois_factors(registration, config);
    (upstream.or(Some(clamp_points(points))), factors)
}

fn whois_factors(registration: &DomainRegistration, config: &RiskConfig) -> (i64, Vec<Tag>) {
    let weights = &config.domain_trust;
    let mut points = i64::from(weights.base);
    let mut factors = Vec::with_capacity(4);

    match registration.age_years {
        Some(age) if age >= weights.established_years => {
            points += i64::from(weights.established_bonus);
            factors.push(Tag::new(
                format!("Registered {age:.1} years ago"),
                TagSeverity::Positive,
            ));
        }
        Some(age) if age < weights.new_domain_years => {
            points -= i64::from(weights.new_domain_penalty);
            factors.push(Tag::new(
                "Registered less than a year ago",
                TagSeverity::Negative,
            ));
        }
        Some(age) => factors.push(Tag::new(
            format!("Registered {age:.1} years ago"),
            TagSeverity::Caution,
        )),
        None => factors.push(Tag::new("Domain age unknown", TagSeverity::Neutral)),
    }

    match registration.days_since_last_update {
        Some(days) if days > weights.stale_update_days => {
            points -= i64::from(weights.stale_update_penalty);
            factors.push(Tag::new(
                format!("WHOIS not updated in {days} days"),
                TagSeverity::Negative,
            ));
        }
        Some(days) => factors.push(Tag::new(
            format!("WHOIS updated {days} days ago"),
            TagSeverity::Positive,
        )),
        None => factors.push(Tag::new("Last WHOIS update unknown", TagSeverity::Neutral)),
    }

    if registration.private_registration {
        points -= i64::from(weights.private_registration_penalty);
        factors.push(Tag::new("WHOIS privacy enabled", TagSeverity::Negative));
    } else {
        factors.push(Tag::new("Public WHOIS record", TagSeverity::Positive));
    }

    let registrar = registration.registrar.trim();
    if !registrar.is_empty() {
        factors.push(Tag::new(
            format!("Registrar: {registrar}"),
            TagSeverity::Neutral,
        ));
    }

    (points, factors)
}

fn heuristic_reasons(
    bundle: &SignalBundle,
    submitted_url: Option<&str>,
    config: &RiskConfig,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(content) = bundle.content_signals.as_ref() {
        if !content.ssl_present {
            reasons.push("No SSL/TLS encryption".to_string());
        }
        let scripts = content.third_party_script_count;
        if scripts > config.script_negative_above {
            reasons.push(format!("High number of third-party scripts ({scripts})"));
        } else if scripts > config.script_caution_above {
            reasons.push(format!("Moderate third-party scripts ({scripts})"));
        }
        if !content.has_privacy_link {
            reasons.push("No privacy policy found".to_string());
        }
    }

    let hops = bundle.redirect_chain.len();
    if hops > LONG_REDIRECT_HOPS {
        reasons.push(format!("Long redirect chain ({hops} hops)"));
    } else if hops > 1 {
        reasons.push(format!("Redirect chain ({hops} hops)"));
    }

    if let Some(final_host) = host_of(&bundle.final_url) {
        if final_host.split('.').count() > NESTED_SUBDOMAIN_LABELS {
            reasons.push("Deeply nested subdomain".to_string());
        }
        let suspicious = final_host
            .rsplit('.')
            .next()
            .is_some_and(|tld| SUSPICIOUS_TLDS.contains(&tld));
        if suspicious {
            reasons.push("Suspicious top-level domain".to_string());
        }
        let input_host = submitted_url
            .or_else(|| bundle.redirect_chain.first().map(String::as_str))
            .and_then(host_of);
        if let Some(input_host) = input_host.filter(|host| *host != final_host) {
            reasons.push(format!(
                "Final domain ({final_host}) differs from input ({input_host})"
            ));
        }
    }

    reasons
}

fn to_score(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 100.0) as u8)
}

fn clamp_points(points: i64) -> u8 {
    points.clamp(0, 100) as u8
}
