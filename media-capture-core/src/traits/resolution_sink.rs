use crate::models::outcome::CaptureOutcome;
use crate::models::request::CallbackToken;

/// Exactly-once delivery boundary back to the caller.
///
/// Called from whichever thread resolved the request, while that request is
/// locked. Implementations must not call back into the orchestrator for the
/// same request.
pub trait ResolutionSink: Send + Sync {
    fn resolve(&self, callback: &CallbackToken, outcome: CaptureOutcome);
}

impl<F> ResolutionSink for F
where
    F: Fn(&CallbackToken, CaptureOutcome) + Send + Sync,
{
    fn resolve(&self, callback: &CallbackToken, outcome: CaptureOutcome) {
        self(callback, outcome)
    }
}
