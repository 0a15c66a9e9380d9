//! Ops/maintenance error catalog (spec §4.11).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("worker '{worker_id}' could not acquire the lease for shard '{shard}': held until fencing token {held_fencing_token}")]
    LeaseHeld {
        worker_id: String,
        shard: String,
        held_fencing_token: u64,
    },

    #[error("worker '{0}' presented a stale fencing token")]
    StaleFencingToken(String),
}

impl ErrorCode for OpsError {
    fn code(&self) -> &'static str {
        match self {
            OpsError::LeaseHeld { .. } => "OPS_LEASE_HELD",
            OpsError::StaleFencingToken(_) => "OPS_STALE_FENCING_TOKEN",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            OpsError::LeaseHeld { .. } => ErrorClass::Conflict,
            OpsError::StaleFencingToken(_) => ErrorClass::Conflict,
        }
    }
}
