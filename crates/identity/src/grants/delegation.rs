//! `DelegationGrant` (agent→agent) reducer — the grant kind x402 gates bind
//! to for per-call/daily spend enforcement (spec §4.5).

use settld_api::Reducer;
use settld_types::Event;

use super::{reduce_grant_event, GrantKind, GrantRecord};

#[derive(Default)]
pub struct DelegationGrantReducer;

impl Reducer for DelegationGrantReducer {
    type Snapshot = GrantRecord;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        reduce_grant_event(
            GrantKind::Delegation,
            snapshot,
            event,
            "delegation_grant.issued",
            "delegation_grant.revoked",
        )
        .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}
