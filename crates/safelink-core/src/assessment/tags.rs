//! Descriptive tags. Computed for every bundle, independent of any score.

use super::{RiskConfig, Tag, TagSeverity};
use crate::signals::{ContentSignals, SignalBundle};

pub fn derive_tags(bundle: &SignalBundle, config: &RiskConfig) -> Vec<Tag> {
    let mut tags = Vec::new();
    if let Some(content) = bundle.content_signals.as_ref() {
        content_tags(content, config, &mut tags);
    }
    if let Some(tld) = bundle
        .domain_registration
        .as_ref()
        .map(|registration| registration.tld.trim().trim_start_matches('.'))
        .filter(|tld| !tld.is_empty())
    {
        let severity = if config.is_safe_tld(tld) {
            TagSeverity::Neutral
        } else {
            TagSeverity::Caution
        };
        tags.push(Tag::new(format!(".{}", tld.to_ascii_lowercase()), severity));
    }
    tags
}

fn content_tags(content: &ContentSignals, config: &RiskConfig, tags: &mut Vec<Tag>) {
    tags.push(if content.ssl_present {
        Tag::new("HTTPS", TagSeverity::Positive)
    } else {
        Tag::new("No HTTPS", TagSeverity::Negative)
    });
    tags.push(if content.has_login_form {
        Tag::new("Login Form", TagSeverity::Negative)
    } else {
        Tag::new("No Login Form", TagSeverity::Positive)
    });

    let count = content.third_party_script_count;
    let severity = if count > config.script_negative_above {
        TagSeverity::Negative
    } else if count > config.script_caution_above {
        TagSeverity::Caution
    } else {
        TagSeverity::Neutral
    };
    let noun = if count == 1 { "Script" } else { "Scripts" };
    tags.push(Tag::new(format!("{count} Third-Party {noun}"), severity));

    if !content.has_privacy_link {
        tags.push(Tag::new("No Privacy Policy", TagSeverity::Negative));
    }
}
