//! Error types for the composition root's own aggregates (`Job`, `Run`,
//! `Governance`) and for command-level failures that don't belong to any
//! single subsystem crate, grounded on the per-subsystem `thiserror` enums
//! seen throughout this workspace (e.g. `settld_x402::X402Error`).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorDomainError {
    #[error("{aggregate} {id} is in state {state}, which does not accept this transition")]
    IllegalStateTransition {
        aggregate: String,
        id: String,
        state: String,
    },

    #[error("event payload failed validation: {0}")]
    EventPayloadInvalid(String),

    #[error("run {0} has no linked job")]
    RunHasNoJob(String),
}

impl ErrorCode for CoordinatorDomainError {
    fn code(&self) -> &'static str {
        match self {
            CoordinatorDomainError::IllegalStateTransition { .. } => {
                "COORDINATOR_ILLEGAL_STATE_TRANSITION"
            }
            CoordinatorDomainError::EventPayloadInvalid(_) => "EVENT_PAYLOAD_INVALID",
            CoordinatorDomainError::RunHasNoJob(_) => "COORDINATOR_RUN_HAS_NO_JOB",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            CoordinatorDomainError::IllegalStateTransition { .. } => ErrorClass::Conflict,
            CoordinatorDomainError::EventPayloadInvalid(_) => ErrorClass::Schema,
            CoordinatorDomainError::RunHasNoJob(_) => ErrorClass::Precondition,
        }
    }
}
