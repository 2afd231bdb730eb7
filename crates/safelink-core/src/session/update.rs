use tracing::debug;

use super::{Effect, Msg, RequestId, ScanFailure, ScanSession, SessionState};
use crate::assessment::assess_submission;
use crate::url::normalize_url;

/// Pure update function: applies a message to the session and returns the
/// effects the runtime must perform.
pub fn update(mut session: ScanSession, msg: Msg) -> (ScanSession, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            session.input = text;
            session.input_error = None;
            Vec::new()
        }
        Msg::Submit(raw) => {
            session.input = raw;
            let url = match normalize_url(&session.input) {
                Ok(url) => url,
                Err(err) => {
                    debug!(error = %err, "submission rejected");
                    session.input_error = Some(err);
                    return (session, Vec::new());
                }
            };
            session.input_error = None;

            let mut effects = Vec::with_capacity(2);
            if let SessionState::InFlight { request_id, .. } = session.state {
                effects.push(Effect::AbandonScan { request_id });
            }
            let request_id = session.allocate_request_id();
            debug!(request_id, %url, "scan dispatched");
            session.state = SessionState::InFlight {
                request_id,
                url: url.clone(),
            };
            effects.push(Effect::DispatchScan { request_id, url });
            effects
        }
        Msg::ScanSucceeded { request_id, bundle } => {
            if let Some(url) = take_in_flight(&mut session, request_id) {
                let assessment =
                    assess_submission(&bundle, Some(url.as_str()), &session.config);
                debug!(request_id, tier = ?assessment.tier, "scan succeeded");
                session.state = SessionState::Succeeded {
                    request_id,
                    url,
                    bundle,
                    assessment: Box::new(assessment),
                };
            }
            Vec::new()
        }
        Msg::ScanFailed {
            request_id,
            message,
        } => {
            if let Some(url) = take_in_flight(&mut session, request_id) {
                let failure = ScanFailure::from_backend(message.as_deref());
                debug!(request_id, message = %failure, "scan failed");
                session.state = SessionState::Failed {
                    request_id,
                    url,
                    failure,
                };
            }
            Vec::new()
        }
        Msg::Reset => {
            // Request ids keep increasing across resets.
            let mut effects = Vec::new();
            if let SessionState::InFlight { request_id, .. } = session.state {
                effects.push(Effect::AbandonScan { request_id });
            }
            session.state = SessionState::Idle;
            session.input.clear();
            session.input_error = None;
            effects
        }
    };

    (session, effects)
}

/// Returns the in-flight URL when `request_id` is the current request.
fn take_in_flight(session: &mut ScanSession, request_id: RequestId) -> Option<String> {
    match &mut session.state {
        SessionState::InFlight {
            request_id: current,
            url,
        } if *current == request_id => Some(std::mem::take(url)),
        other => {
            debug!(
                request_id,
                current = ?other.request_id(),
                "discarding stale scan response"
            );
            None
        }
    }
}
