//! `AuthorityGrant` / `DelegationGrant` / `CapabilityAttestation` (spec §3
//! "Grants", §4.4): principal→agent, agent→agent, and issuer→subject grants
//! sharing one canonical-hash + chain-binding + validity-window shape.
//! Per-kind modules ([`authority`], [`delegation`], [`capability`]) are thin
//! reducers over this shared [`GrantRecord`], matching how the teacher's
//! `ibc::core` keeps one `ConnectionEnd`/`ChannelEnd` shape reused by
//! several handshake-specific modules.

pub mod authority;
pub mod capability;
pub mod delegation;
pub mod lineage;

use serde::{Deserialize, Serialize};
use settld_types::{Cents, Currency, Event, GrantId, Timestamp};

use crate::error::IdentityError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    Authority,
    Delegation,
    Capability,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Validity {
    pub not_before: Timestamp,
    pub expires_at: Option<Timestamp>,
}

impl Validity {
    pub fn contains(&self, at: Timestamp) -> bool {
        if at < self.not_before {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => at < expires_at,
            None => true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpendLimit {
    pub max_per_call_cents: Option<Cents>,
    pub max_daily_cents: Option<Cents>,
    pub max_total_cents: Option<Cents>,
    pub currency: Currency,
}

impl SpendLimit {
    pub fn exceeds_per_call(&self, amount_cents: Cents) -> bool {
        matches!(self.max_per_call_cents, Some(max) if amount_cents > max)
    }

    pub fn exceeds_daily(&self, cumulative_today_cents: Cents, amount_cents: Cents) -> bool {
        matches!(self.max_daily_cents, Some(max) if cumulative_today_cents + amount_cents > max)
    }

    pub fn exceeds_total(&self, cumulative_total_cents: Cents, amount_cents: Cents) -> bool {
        matches!(self.max_total_cents, Some(max) if cumulative_total_cents + amount_cents > max)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScopePredicates {
    /// `None` means "not scope-restricted", i.e. every value is allowed.
    pub allowed_tool_ids: Option<Vec<String>>,
    pub allowed_provider_ids: Option<Vec<String>>,
    pub allowed_risk_classes: Option<Vec<String>>,
    pub side_effecting_allowed: bool,
    pub spend_limit: Option<SpendLimit>,
}

impl ScopePredicates {
    pub fn allows_tool(&self, tool_id: &str) -> bool {
        self.allowed_tool_ids
            .as_ref()
            .map(|allowed| allowed.iter().any(|t| t == tool_id))
            .unwrap_or(true)
    }

    pub fn allows_provider(&self, provider_id: &str) -> bool {
        self.allowed_provider_ids
            .as_ref()
            .map(|allowed| allowed.iter().any(|p| p == provider_id))
            .unwrap_or(true)
    }

    pub fn allows_risk_class(&self, risk_class: &str) -> bool {
        self.allowed_risk_classes
            .as_ref()
            .map(|allowed| allowed.iter().any(|r| r == risk_class))
            .unwrap_or(true)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainBinding {
    pub root_grant_hash: String,
    pub parent_grant_hash: Option<String>,
    pub depth: u32,
    pub max_delegation_depth: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Revocation {
    pub at: Timestamp,
    pub reason: String,
}

/// The reduced state of one grant stream, shared by all three grant kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrantRecord {
    pub grant_id: GrantId,
    pub kind: GrantKind,
    pub issuer: String,
    pub subject: String,
    pub grant_hash: String,
    pub chain_binding: ChainBinding,
    pub validity: Validity,
    pub scope: ScopePredicates,
    pub revocation: Option<Revocation>,
    pub revision: u64,
}

impl GrantRecord {
    pub fn is_revoked(&self) -> bool {
        self.revocation.is_some()
    }

    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        !self.is_revoked() && self.validity.contains(at)
    }
}

/// Shared `issued`/`revoked` reduction for all three grant kinds, so
/// `authority`/`delegation`/`capability` differ only in their event-type
/// prefix and [`GrantKind`] tag.
pub(crate) fn reduce_grant_event(
    kind: GrantKind,
    snapshot: Option<GrantRecord>,
    event: &Event,
    issued_suffix: &str,
    revoked_suffix: &str,
) -> Result<GrantRecord, IdentityError> {
    let payload = &event.payload;
    if event.event_type.ends_with(issued_suffix) {
        let grant_id = field_str(payload, "grantId")?.to_string();
        let parent_grant_hash = payload
            .get("parentGrantHash")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        let depth = payload
            .get("depth")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as u32;
        let root_grant_hash = payload
            .get("rootGrantHash")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| field_str(payload, "grantHash").unwrap_or("").to_string());
        let max_delegation_depth = payload
            .get("maxDelegationDepth")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(5) as u32;
        let spend_limit = payload.get("spendLimit").map(|sl| SpendLimit {
            max_per_call_cents: sl.get("maxPerCallCents").and_then(serde_json::Value::as_i64),
            max_daily_cents: sl.get("maxDailyCents").and_then(serde_json::Value::as_i64),
            max_total_cents: sl.get("maxTotalCents").and_then(serde_json::Value::as_i64),
            currency: Currency::new(
                sl.get("currency")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("USD"),
            ),
        });
        Ok(GrantRecord {
            grant_id: settld_types::GrantId::from(grant_id),
            kind,
            issuer: field_str(payload, "issuer")?.to_string(),
            subject: field_str(payload, "subject")?.to_string(),
            grant_hash: field_str(payload, "grantHash")?.to_string(),
            chain_binding: ChainBinding {
                root_grant_hash,
                parent_grant_hash,
                depth,
                max_delegation_depth,
            },
            validity: Validity {
                not_before: event.at,
                expires_at: payload
                    .get("expiresAt")
                    .and_then(serde_json::Value::as_str)
                    .and_then(|s| Timestamp::parse(s).ok()),
            },
            scope: ScopePredicates {
                allowed_tool_ids: str_array_opt(payload, "allowedToolIds"),
                allowed_provider_ids: str_array_opt(payload, "allowedProviderIds"),
                allowed_risk_classes: str_array_opt(payload, "allowedRiskClasses"),
                side_effecting_allowed: payload
                    .get("sideEffectingAllowed")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false),
                spend_limit,
            },
            revocation: None,
            revision: 1,
        })
    } else if event.event_type.ends_with(revoked_suffix) {
        let mut record = snapshot.ok_or_else(|| {
            IdentityError::GrantNotFound("revoke applied to unknown grant stream".to_string())
        })?;
        record.revocation = Some(Revocation {
            at: event.at,
            reason: payload
                .get("reason")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unspecified")
                .to_string(),
        });
        record.revision += 1;
        Ok(record)
    } else {
        Err(IdentityError::EventPayloadInvalid(format!(
            "unrecognized grant event type '{}'",
            event.event_type
        )))
    }
}

fn field_str<'a>(v: &'a serde_json::Value, field: &str) -> Result<&'a str, IdentityError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| IdentityError::EventPayloadInvalid(format!("missing field '{field}'")))
}

fn str_array_opt(v: &serde_json::Value, field: &str) -> Option<Vec<String>> {
    v.get(field)?.as_array().map(|arr| {
        arr.iter()
            .filter_map(|x| x.as_str().map(str::to_string))
            .collect()
    })
}
