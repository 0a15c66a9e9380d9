//! `AuthorityGrant` (principal→agent) reducer.

use settld_api::Reducer;
use settld_types::Event;

use super::{reduce_grant_event, GrantKind, GrantRecord};

#[derive(Default)]
pub struct AuthorityGrantReducer;

impl Reducer for AuthorityGrantReducer {
    type Snapshot = GrantRecord;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        reduce_grant_event(
            GrantKind::Authority,
            snapshot,
            event,
            "authority_grant.issued",
            "authority_grant.revoked",
        )
        .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}
