use serde::Serialize;

use crate::models::Certificate;

use super::AttemptState;

/// Point-in-time view of the attempt, pushed to the embedding shell on
/// every state change and countdown tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub state: AttemptState,
    pub remaining_secs: u32,
}

/// Result of a completed attempt. `certificate` is present only for a
/// passing score (and may be absent if issuance failed after the pass).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub attempt_id: String,
    pub score: u8,
    pub passed: bool,
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizEvent {
    StateChanged(QuizSnapshot),
    Completed(QuizOutcome),
    /// Fires a fixed delay after a passing submit, once the success view has
    /// had time to render. The shell navigates to the certificate viewer.
    CertificateReady { certificate_id: String },
}
