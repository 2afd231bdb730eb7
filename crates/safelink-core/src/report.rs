use std::fmt::Write;

use crate::view::{DashboardView, Phase, ReportView};

/// Format styles supported by the built-in renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Produce a report string from a `ReportView` using the desired format.
pub fn render_report(report: &ReportView, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(report),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
    }
}

/// Render the whole dashboard; the report section only appears once ready.
pub fn render_dashboard(view: &DashboardView, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => return Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Yaml => return Ok(serde_yaml::to_string(view)?),
        OutputFormat::Human => {}
    }
    let mut out = String::new();
    if let Some(error) = &view.input_error {
        writeln!(out, "Input error: {error}")?;
    }
    match (view.phase, &view.report) {
        (Phase::Idle, _) => writeln!(out, "Enter a URL to scan.")?,
        (Phase::Scanning, _) => writeln!(
            out,
            "Scanning {}...",
            view.scanned_url.as_deref().unwrap_or_default()
        )?,
        (Phase::Failed, _) => writeln!(
            out,
            "Scan failed: {}",
            view.error.as_deref().unwrap_or_default()
        )?,
        (Phase::Ready, Some(report)) => out.push_str(&render_human(report)?),
        (Phase::Ready, None) => {}
    }
    Ok(out)
}

fn render_human(report: &ReportView) -> anyhow::Result<String> {
    let mut out = String::new();
    let score = report
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "--".into());
    writeln!(out, "Safety Score: {score} ({:?})", report.band)?;
    writeln!(out, "Risk Tier: {}", report.tier_label)?;
    writeln!(out, "URL: {}", report.final_url)?;

    if let Some(warning) = &report.threat_message {
        writeln!(out, "\n{warning}")?;
    }

    if !report.tags.is_empty() {
        let tags: Vec<_> = report.tags.iter().map(|t| t.label.as_str()).collect();
        writeln!(out, "\nTags: {}", tags.join(", "))?;
    }

    writeln!(out, "\nCategories:")?;
    for bar in &report.categories {
        let score = bar
            .score
            .map(|s| format!("{s:>3}"))
            .unwrap_or_else(|| "  -".into());
        writeln!(out, "  - {:<15} {score} ({:?})", bar.label, bar.band)?;
        for factor in &bar.factors {
            writeln!(out, "      {} [{:?}]", factor.label, factor.severity)?;
        }
    }

    writeln!(out, "\nSummary:\n  {}", report.narrative)?;

    if !report.reasons.is_empty() {
        writeln!(out, "\nReasons:")?;
        for reason in &report.reasons {
            writeln!(out, "  - {reason}")?;
        }
    }

    writeln!(out, "\nRedirect Chain:")?;
    if report.redirects.is_empty() {
        writeln!(out, "  No redirects detected")?;
    } else {
        for hop in &report.redirects {
            writeln!(out, "  {} {}", hop.status_code, hop.domain)?;
        }
    }

    writeln!(out, "\nTechnical Details:")?;
    for row in &report.metadata {
        writeln!(out, "  {:<20} {}", format!("{}:", row.label), row.value)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{assess, RiskConfig};
    use crate::signals::SignalBundle;

    fn sample_report() -> ReportView {
        let bundle = SignalBundle::from_json(
            r#"{
                "finalUrl": "https://example.com/",
                "redirectChain": ["http://example.com", "https://example.com/"],
                "contentSignals": {"sslPresent": true, "hasPrivacyLink": true,
                    "hasLoginForm": false, "thirdPartyScriptCount": 2},
                "backendVerdict": {"score": 88, "tier": "LOW", "reasons": [],
                    "narrative": "Looks fine."}
            }"#,
        )
        .unwrap();
        let assessment = assess(&bundle);
        ReportView::new(&bundle, &assessment, &RiskConfig::default())
    }

    #[test]
    fn human_report_contains_sections() {
        let output = render_report(&sample_report(), OutputFormat::Human).unwrap();
        assert!(output.contains("Safety Score: 88 (Safe)"));
        assert!(output.contains("Risk Tier: Safe"));
        assert!(output.contains("302 example.com"));
        assert!(output.contains("200 example.com/"));
        assert!(output.contains("Looks fine."));
        assert!(output.contains("Privacy Policy:"));
    }

    #[test]
    fn json_report_serializes() {
        let output = render_report(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["score"], serde_json::json!(88));
        assert_eq!(value["band"], serde_json::json!("safe"));
        assert!(value["categories"].is_array());
    }

    #[test]
    fn yaml_report_serializes() {
        let output = render_report(&sample_report(), OutputFormat::Yaml).unwrap();
        assert!(output.contains("tier_label: Safe"));
    }

    #[test]
    fn idle_dashboard_prompts_for_input() {
        let view = crate::session::ScanSession::new().view();
        let output = render_dashboard(&view, OutputFormat::Human).unwrap();
        assert_eq!(output.trim(), "Enter a URL to scan.");
    }
}
