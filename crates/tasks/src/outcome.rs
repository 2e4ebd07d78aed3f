//! Mapping from gateway output to the values a worker writes back.
//!
//! The gateway folds every failure into its returned text, and tasks have
//! no failed state, so today every outcome completes the task normally.
//! This is the one place a stricter mode would change.

use croplens_core::task::{TaskCompletion, MSG_COMPLETED};

/// Result text written when shutdown interrupts a worker mid-call.
pub const INTERRUPTED_RESULT: &str =
    "Task interrupted: the server shut down before the model answered.";

/// Prefix of the result written when the model pipeline panics.
pub const PANICKED_RESULT_PREFIX: &str = "Task failed: model pipeline panicked: ";

pub fn gateway_outcome_to_task_result(outcome: String) -> TaskCompletion {
    TaskCompletion {
        message: MSG_COMPLETED.to_string(),
        result: outcome,
    }
}
