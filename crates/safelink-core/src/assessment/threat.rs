/// Display name for a threat-list category code. Unrecognized codes pass through.
pub fn threat_display_name(code: &str) -> &str {
    match code {
        "MALWARE" => "Malware",
        "SOCIAL_ENGINEERING" => "Social Engineering",
        "UNWANTED_SOFTWARE" => "Unwanted Software",
        "POTENTIALLY_HARMFUL_APPLICATION" => "Potentially Harmful Application",
        other => other,
    }
}

/// One-sentence warning for a flagged URL, listing each category once.
pub fn threat_message(categories: &[String]) -> String {
    let mut names: Vec<&str> = Vec::with_capacity(categories.len());
    for name in categories
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .map(threat_display_name)
    {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        "Warning: Google has flagged this website as unsafe. Proceed with caution.".to_string()
    } else {
        format!(
            "Warning: Google has flagged this website for {}. Proceed with caution.",
            names.join(", ")
        )
    }
}
