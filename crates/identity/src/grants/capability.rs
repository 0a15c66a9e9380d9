//! `CapabilityAttestation` (issuer→subject) reducer.

use settld_api::Reducer;
use settld_types::Event;

use super::{reduce_grant_event, GrantKind, GrantRecord};

#[derive(Default)]
pub struct CapabilityAttestationReducer;

impl Reducer for CapabilityAttestationReducer {
    type Snapshot = GrantRecord;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        reduce_grant_event(
            GrantKind::Capability,
            snapshot,
            event,
            "capability_attestation.issued",
            "capability_attestation.revoked",
        )
        .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}
