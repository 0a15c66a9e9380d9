//! Chain-binding resolution (spec §4.4): "walks `parentGrantHash` pointers
//! to the root; the walk fails closed on cycles, unknown parents, depth >
//! `maxDelegationDepth`, or any link outside its validity window."

use std::collections::HashSet;

use settld_types::Timestamp;

use super::GrantRecord;
use crate::error::IdentityError;

/// Resolves the `effectiveDelegationHash` for `grant` by walking
/// `parentGrantHash` pointers to the root, via `lookup` (keyed by
/// `grantHash`). Fails closed per spec §4.4.
pub fn resolve_effective_delegation_hash<F>(
    grant: &GrantRecord,
    at: Timestamp,
    lookup: F,
) -> Result<String, IdentityError>
where
    F: Fn(&str) -> Option<GrantRecord>,
{
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = grant.clone();

    loop {
        if !visited.insert(current.grant_hash.clone()) {
            return Err(IdentityError::GrantCycleDetected(current.grant_hash));
        }
        if !current.is_valid_at(at) {
            return Err(IdentityError::GrantOutsideValidityWindow(
                current.grant_hash,
            ));
        }
        if current.revocation.is_some() {
            return Err(IdentityError::GrantRevoked(current.grant_hash));
        }
        if current.chain_binding.depth > current.chain_binding.max_delegation_depth {
            return Err(IdentityError::GrantDepthExceeded {
                depth: current.chain_binding.depth,
                max_depth: current.chain_binding.max_delegation_depth,
            });
        }

        match &current.chain_binding.parent_grant_hash {
            None => return Ok(current.chain_binding.root_grant_hash.clone()),
            Some(parent_hash) => {
                let parent = lookup(parent_hash)
                    .ok_or_else(|| IdentityError::GrantUnknownParent(parent_hash.clone()))?;
                current = parent;
            }
        }
    }
}
