//! Shared utilities for use cases.

use crate::use_cases::run_pipeline::PipelineError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(PipelineError::Cancelled)` if the token exists and is
/// cancelled. Called between stage transitions only: mid-stage
/// cancellation is delegated to the gateway's own contract.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), PipelineError> {
    if let Some(token) = token {
        if token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_token_never_cancels() {
        assert!(check_cancelled(&None).is_ok());
    }

    #[test]
    fn test_cancelled_token_reports() {
        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());
        token.cancel();
        assert!(check_cancelled(&Some(token)).is_err());
    }
}
