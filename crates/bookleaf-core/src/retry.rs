//! Re-run an operation after optimistic-concurrency conflicts.
//!
//! Writes never merge: when a version token is stale, the whole
//! read-modify-write is run again from a fresh read.

use crate::error::EngineError;

/// Run `op` until it succeeds, fails with a non-conflict error, or has
/// conflicted `max_retries + 1` times.
///
/// Each retry is logged at `warn`. The final conflict is returned as-is.
pub fn retry_on_conflict<T, F>(max_retries: u32, op_name: &str, mut op: F) -> Result<T, EngineError>
where
    F: FnMut() -> Result<T, EngineError>,
{
    let mut attempt: u32 = 0;
    loop {
        match op() {
            Err(err) if err.is_retryable() && attempt < max_retries => {
                attempt = attempt.saturating_add(1);
                tracing::warn!(
                    op = op_name,
                    attempt,
                    max_retries,
                    error = %err,
                    "Version conflict, retrying"
                );
            }
            other => return other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn conflict() -> EngineError {
        EngineError::ConcurrencyConflict { entity: "settings" }
    }

    #[test]
    fn succeeds_after_transient_conflicts() {
        let mut calls = 0;
        let result = retry_on_conflict(3, "test", || {
            calls += 1;
            if calls < 3 { Err(conflict()) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_budget() {
        let mut calls = 0;
        let result: Result<(), _> = retry_on_conflict(2, "test", || {
            calls += 1;
            Err(conflict())
        });
        assert_eq!(result.unwrap_err(), conflict());
        assert_eq!(calls, 3);
    }

    #[test]
    fn other_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = retry_on_conflict(5, "test", || {
            calls += 1;
            Err(EngineError::invalid("dead plant"))
        });
        assert!(matches!(result, Err(EngineError::InvalidOperation { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_budget_runs_once() {
        let mut calls = 0;
        let result: Result<(), _> = retry_on_conflict(0, "test", || {
            calls += 1;
            Err(conflict())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
