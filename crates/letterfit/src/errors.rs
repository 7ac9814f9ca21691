use thiserror::Error;

/// Library-level error type.
///
/// The solver and adjuster are leaf components: they surface errors verbatim
/// to the caller rather than attempting recovery, because a guessed size is
/// indistinguishable from a correct one on a physically printed document.
#[derive(Debug, Error)]
pub enum FitError {
    /// Malformed request, rejected before any measurement call is made.
    #[error("Invalid fit request: {0}")]
    InvalidRequest(String),

    /// The measurement backend errored or timed out. Never retried here —
    /// retries and backend re-establishment belong to the orchestration layer.
    #[error("Measurement failed: {0}")]
    Measurement(#[from] anyhow::Error),
}
