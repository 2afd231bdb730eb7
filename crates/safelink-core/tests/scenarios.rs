use std::{fs, path::PathBuf, sync::Arc};

use safelink_core::{
    assess, update, Effect, FixtureBackend, Msg, Phase, RiskTier, ScanRunner, ScanSession,
    SessionState, SignalBundle, TagSeverity,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> SignalBundle {
    let path = fixture_path(name);
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()));
    SignalBundle::from_json(&raw)
        .unwrap_or_else(|err| panic!("failed to parse fixture {name}: {err}"))
}

fn submit(session: ScanSession, raw: &str) -> (ScanSession, Vec<Effect>) {
    update(session, Msg::Submit(raw.to_string()))
}

fn succeed(session: ScanSession, request_id: u64, bundle: SignalBundle) -> ScanSession {
    let (session, effects) = update(
        session,
        Msg::ScanSucceeded {
            request_id,
            bundle: Box::new(bundle),
        },
    );
    assert!(effects.is_empty());
    session
}

#[test]
fn content_only_bundle_scores_every_category() {
    let (session, effects) = submit(ScanSession::new(), "example.com");
    assert_eq!(
        effects,
        vec![Effect::DispatchScan {
            request_id: 1,
            url: "https://example.com".into()
        }]
    );

    let session = succeed(session, 1, load_fixture("content_only.json"));
    let assessment = session.assessment().expect("assessment after success");
    let scores = &assessment.category_scores;
    assert_eq!(scores.ssl, Some(80));
    assert_eq!(scores.content, Some(80));
    assert_eq!(scores.privacy, Some(70));
    assert_eq!(scores.domain_trust, Some(50));
    assert_eq!(assessment.tier, RiskTier::Unknown);
    assert_eq!(assessment.overall_score, None);
    assert!(assessment.threat_message.is_none());
}

#[test]
fn empty_input_is_rejected_without_backend_call() {
    let (session, effects) = submit(ScanSession::new(), "");
    assert!(effects.is_empty());
    assert_eq!(session.state(), &SessionState::Idle);
    assert_eq!(
        session.view().input_error.as_deref(),
        Some("Please enter a URL to scan")
    );
}

#[test]
fn flagged_threat_without_verdict_is_high() {
    let (session, _) = submit(ScanSession::new(), "malware.testing.google.test");
    let session = succeed(session, 1, load_fixture("flagged_malware.json"));
    let assessment = session.assessment().unwrap();
    assert_eq!(assessment.tier, RiskTier::High);
    let message = assessment.threat_message.as_deref().unwrap();
    assert!(message.starts_with("Warning: Google has flagged this website for Malware"));

    let report = session.view().report.unwrap();
    assert_eq!(report.tier_label, "Dangerous");
}

#[test]
fn stale_success_leaves_newer_result_displayed() {
    let (session, _) = submit(ScanSession::new(), "first.example");
    let (session, effects) = submit(session, "second.example");
    assert_eq!(
        effects,
        vec![
            Effect::AbandonScan { request_id: 1 },
            Effect::DispatchScan {
                request_id: 2,
                url: "https://second.example".into()
            },
        ]
    );

    let session = succeed(session, 2, load_fixture("content_only.json"));
    let before = session.clone();

    let session = succeed(session, 1, load_fixture("flagged_malware.json"));
    assert_eq!(session, before);
    assert_eq!(session.current_request_id(), Some(2));
    assert_eq!(session.assessment().unwrap().tier, RiskTier::Unknown);
}

#[test]
fn stale_failure_is_discarded() {
    let (session, _) = submit(ScanSession::new(), "first.example");
    let (session, _) = submit(session, "second.example");
    let (session, effects) = update(
        session,
        Msg::ScanFailed {
            request_id: 1,
            message: Some("Timed out".into()),
        },
    );
    assert!(effects.is_empty());
    assert!(session.is_in_flight());
    assert_eq!(session.current_request_id(), Some(2));
}

#[test]
fn backend_verdict_passes_through_regardless_of_signals() {
    let bundle = load_fixture("legacy_preview.json");
    let assessment = assess(&bundle);
    assert_eq!(assessment.overall_score, Some(42));
    assert_eq!(assessment.tier, RiskTier::Medium);
    assert_eq!(
        assessment.reasons,
        vec![
            "Recently registered domain".to_string(),
            "Credential form on first visit".to_string()
        ]
    );
    assert_eq!(
        assessment.narrative,
        "The page asks for credentials on a young domain."
    );
}

#[test]
fn legacy_preview_shape_drives_tags_and_timeline() {
    let bundle = load_fixture("legacy_preview.json");
    let assessment = assess(&bundle);

    let tags: Vec<_> = assessment
        .tags
        .iter()
        .map(|tag| (tag.label.as_str(), tag.severity))
        .collect();
    assert!(tags.contains(&("No HTTPS", TagSeverity::Negative)));
    assert!(tags.contains(&("Login Form", TagSeverity::Negative)));
    assert!(tags.contains(&("No Privacy Policy", TagSeverity::Negative)));
    assert!(tags.contains(&(".xyz", TagSeverity::Caution)));

    let (session, _) = submit(ScanSession::new(), "bit.example/abc");
    let session = succeed(session, 1, bundle);
    let report = session.view().report.unwrap();
    let codes: Vec<_> = report.redirects.iter().map(|hop| hop.status_code).collect();
    assert_eq!(codes, vec![302, 302, 200]);
    assert_eq!(report.redirects[0].domain, "bit.example/abc");
}

#[test]
fn assess_is_total_on_empty_bundle() {
    let assessment = assess(&SignalBundle::default());
    assert_eq!(assessment.overall_score, None);
    assert_eq!(assessment.tier, RiskTier::Unknown);
    assert!(assessment.tags.is_empty());
    assert_eq!(assessment.category_scores.domain_trust, None);
}

#[tokio::test]
async fn runner_scans_through_fixture_backend() {
    let backend = Arc::new(FixtureBackend::new(fixture_path("content_only.json")));
    let mut runner = ScanRunner::new(backend, ScanSession::new());
    runner.submit("example.com");
    let session = runner.run_until_settled().await;

    let view = session.view();
    assert_eq!(view.phase, Phase::Ready);
    let report = view.report.unwrap();
    assert_eq!(report.final_url, "https://example.com");
    assert_eq!(report.categories.len(), 4);
}

#[tokio::test]
async fn runner_reports_missing_fixture_as_generic_failure() {
    let backend = Arc::new(FixtureBackend::new(fixture_path("does_not_exist.json")));
    let mut runner = ScanRunner::new(backend, ScanSession::new());
    runner.submit("example.com");
    let session = runner.run_until_settled().await;

    assert_eq!(session.view().phase, Phase::Failed);
    assert_eq!(session.failure().unwrap().message, "Scan failed");
}

#[tokio::test]
async fn runner_degrades_partial_content_section() {
    let backend = Arc::new(FixtureBackend::new(fixture_path("partial_content.json")));
    let mut runner = ScanRunner::new(backend, ScanSession::new());
    runner.submit("example.com");
    let session = runner.run_until_settled().await;

    let assessment = session.assessment().expect("partial bundle still assesses");
    assert_eq!(assessment.category_scores.ssl, None);
    assert_eq!(assessment.category_scores.content, None);
    assert_eq!(assessment.category_scores.domain_trust, Some(70));
}
