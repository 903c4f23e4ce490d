//! Bulk Operation Helpers
//!
//! Bulk calls are best-effort: every sub-operation is attempted, and
//! failures are gathered into one [`Error::PartialFailure`].

use crate::error::{Error, OperationFailure, Result};
use tracing::warn;

/// Size used for slots the caller gave no size for
pub const DEFAULT_VOLUME_SIZE_GB: u64 = 1;

/// Exactly `count` sizes: `provided` in order (truncated to `count`),
/// then `default` for every remaining slot
pub fn plan_volume_sizes(count: usize, provided: &[u64], default: u64) -> Vec<u64> {
    provided
        .iter()
        .copied()
        .chain(std::iter::repeat(default))
        .take(count)
        .collect()
}

/// Fold per-item results into the successes, or a partial-failure error
/// naming every failed target
pub fn collect_outcomes<T>(operation: &str, outcomes: Vec<(String, Result<T>)>) -> Result<Vec<T>> {
    let attempted = outcomes.len();
    let mut succeeded = Vec::with_capacity(attempted);
    let mut failures = Vec::new();

    for (target, outcome) in outcomes {
        match outcome {
            Ok(value) => succeeded.push(value),
            Err(e) => {
                warn!(operation = operation, target = %target, error = %e, "Bulk sub-operation failed");
                failures.push(OperationFailure {
                    target,
                    reason: e.to_string(),
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(succeeded)
    } else {
        Err(Error::PartialFailure {
            operation: operation.to_string(),
            attempted,
            failures,
        })
    }
}
