use serde::{Deserialize, Serialize};
use thiserror::Error;
use ::url::Url;

const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Rejections produced while normalizing user-entered URLs.
///
/// The `Display` text is the message shown next to the input box.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlError {
    #[error("Please enter a URL to scan")]
    EmptyInput,
    #[error("Please enter a valid URL")]
    InvalidUrl,
}

/// Turn raw user text into a canonical absolute URL.
///
/// Surrounding whitespace is trimmed and `https://` is prepended when no
/// `http://`/`https://` prefix is present (case-insensitive). The candidate is
/// returned as written once it parses as an absolute URL, so normalizing an
/// already-normalized URL returns it unchanged.
pub fn normalize_url(raw: &str) -> Result<String, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::EmptyInput);
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{trimmed}")
    };

    match Url::parse(&candidate) {
        Ok(parsed) if parsed.has_host() => Ok(candidate),
        _ => Err(UrlError::InvalidUrl),
    }
}

fn has_http_scheme(text: &str) -> bool {
    starts_with_ignore_case(text, "http://") || starts_with_ignore_case(text, "https://")
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Host portion of an absolute URL, lowercased, if it has one.
pub(crate) fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
}

/// Strip a leading `http://` or `https://` for display.
pub(crate) fn strip_scheme(raw: &str) -> &str {
    for prefix in ["https://", "http://"] {
        if starts_with_ignore_case(raw, prefix) {
            return &raw[prefix.len()..];
        }
    }
    raw
}
