//! Newtype identifiers for every aggregate and stream kind in the data model
//! (spec §3 "Data Model"). Each wraps a non-empty `String` rather than a raw
//! `String` so a misplaced `agent_id` can't silently compile where a
//! `tenant_id` was expected — the same discipline the teacher applies to
//! `AccountId`/`ChainId` in `ioi_types::app::identity`, just string-keyed
//! instead of hash-keyed since these ids are externally assigned, not
//! derived from a public key.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrows the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(TenantId, "Tenant partition key; defaults to `tenant_default`.");
string_id!(AgentId, "Identifier for an `Agent` aggregate.");
string_id!(RunId, "Identifier for a `Run` aggregate (per-agent job execution).");
string_id!(JobId, "Identifier for a `Job` aggregate (principal-created work order).");
string_id!(StreamId, "Identifier for an event stream (one per aggregate instance).");
string_id!(EventId, "Identifier for a single appended `Event`.");
string_id!(GateId, "Identifier for an `X402Gate` aggregate.");
string_id!(GrantId, "Identifier shared by `AuthorityGrant`/`DelegationGrant`/`CapabilityAttestation`.");
string_id!(HoldId, "Identifier for an escrow `Hold` on an agent's wallet.");
string_id!(LedgerEntryId, "Identifier for a `LedgerEntry` (one atomic double-entry posting set).");
string_id!(ArtifactId, "Stable key for a content-addressed `Artifact`.");
string_id!(PartyId, "Identifier for a settlement party (payer, payee, provider, operator).");
string_id!(KeyId, "Identifier for a registered signer public key.");
string_id!(MoneyRailOperationId, "Identifier for a `MoneyRailOperation`.");
string_id!(ProviderId, "Identifier for an external money rail provider (e.g. `stripe`, `ach`).");
string_id!(DisputeCaseId, "Identifier for a `DisputeCase` aggregate.");
string_id!(ArbitrationCaseId, "Identifier for an `ArbitrationCase` aggregate.");
string_id!(MonthCloseId, "Identifier for a `MonthClose` aggregate, keyed by tenant+month.");
string_id!(TriageKey, "Deterministic hash identifying a reconciliation mismatch row.");
string_id!(IdempotencyKey, "Client-supplied key used to memoize the first successful effect of a request.");
string_id!(SessionId, "Identifier for a `Session` aggregate (agent-execution provenance/taint log).");
string_id!(LeaseId, "Identifier for a worker `Lease` held against a `(workerId, shard)` pair.");

impl TenantId {
    /// The tenant id used when a caller supplies none, per spec §3.
    pub fn default_tenant() -> Self {
        Self("tenant_default".to_string())
    }
}
