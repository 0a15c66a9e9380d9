//! Errors for agent lifecycle, grant issuance/lineage, and session/taint
//! evaluation (spec §4.4).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("agent {0} is not registered")]
    AgentNotFound(String),

    #[error("agent {0} is already registered")]
    AgentAlreadyRegistered(String),

    #[error("insufficient available balance for agent {agent_id}: have {available_cents}, need {requested_cents}")]
    InsufficientBalance {
        agent_id: String,
        available_cents: i64,
        requested_cents: i64,
    },

    #[error("grant {0} is not registered")]
    GrantNotFound(String),

    #[error("grant lineage walk detected a cycle at {0}")]
    GrantCycleDetected(String),

    #[error("grant lineage references unknown parent {0}")]
    GrantUnknownParent(String),

    #[error("grant lineage depth {depth} exceeds maxDelegationDepth {max_depth}")]
    GrantDepthExceeded { depth: u32, max_depth: u32 },

    #[error("grant {0} or an ancestor is outside its validity window")]
    GrantOutsideValidityWindow(String),

    #[error("grant {0} has been revoked")]
    GrantRevoked(String),

    #[error("event payload failed validation: {0}")]
    EventPayloadInvalid(String),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for IdentityError {
    fn code(&self) -> &'static str {
        match self {
            IdentityError::AgentNotFound(_) => "AGENT_NOT_FOUND",
            IdentityError::AgentAlreadyRegistered(_) => "AGENT_ALREADY_REGISTERED",
            IdentityError::InsufficientBalance { .. } => "WALLET_INSUFFICIENT_BALANCE",
            IdentityError::GrantNotFound(_) => "GRANT_NOT_FOUND",
            IdentityError::GrantCycleDetected(_) => "GRANT_LINEAGE_CYCLE_DETECTED",
            IdentityError::GrantUnknownParent(_) => "GRANT_LINEAGE_UNKNOWN_PARENT",
            IdentityError::GrantDepthExceeded { .. } => "GRANT_LINEAGE_DEPTH_EXCEEDED",
            IdentityError::GrantOutsideValidityWindow(_) => "GRANT_OUTSIDE_VALIDITY_WINDOW",
            IdentityError::GrantRevoked(_) => "GRANT_REVOKED",
            IdentityError::EventPayloadInvalid(_) => "EVENT_PAYLOAD_INVALID",
            IdentityError::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            IdentityError::AgentNotFound(_) | IdentityError::GrantNotFound(_) => {
                ErrorClass::Precondition
            }
            IdentityError::AgentAlreadyRegistered(_) => ErrorClass::Conflict,
            IdentityError::InsufficientBalance { .. } => ErrorClass::Conflict,
            IdentityError::GrantCycleDetected(_)
            | IdentityError::GrantUnknownParent(_)
            | IdentityError::GrantDepthExceeded { .. }
            | IdentityError::GrantOutsideValidityWindow(_)
            | IdentityError::GrantRevoked(_) => ErrorClass::Policy,
            IdentityError::EventPayloadInvalid(_) => ErrorClass::Schema,
            IdentityError::Codec(_) => ErrorClass::Integrity,
        }
    }
}
