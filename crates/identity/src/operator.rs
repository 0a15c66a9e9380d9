//! The `Operator` aggregate (spec §3): a human or organizational principal
//! who owns agents, creates jobs, and holds the `x-proxy-ops-token`
//! bearer identity spec §6 describes for the ops surface. Modeled the same
//! shallow way as [`crate::robot::RobotSnapshot`] — a registration plus a
//! coarse lifecycle — since the spec gives operators no domain behavior
//! beyond being a principal other aggregates reference by id.

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::Event;

use crate::error::IdentityError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorStatus {
    Active,
    Suspended,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperatorSnapshot {
    pub operator_id: String,
    pub display_name: String,
    pub roles: Vec<String>,
    pub status: OperatorStatus,
    pub revision: u64,
}

impl OperatorSnapshot {
    pub fn is_active(&self) -> bool {
        self.status == OperatorStatus::Active
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Reduces `Operator` stream events (`registered`, `role.granted`,
/// `role.revoked`, `status.changed`) into an [`OperatorSnapshot`].
#[derive(Default)]
pub struct OperatorReducer;

impl Reducer for OperatorReducer {
    type Snapshot = OperatorSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_operator_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_operator_event(
    snapshot: Option<OperatorSnapshot>,
    event: &Event,
) -> Result<OperatorSnapshot, IdentityError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "operator.registered" => Ok(OperatorSnapshot {
            operator_id: event.stream_id.as_str().to_string(),
            display_name: field_str(payload, "displayName")?.to_string(),
            roles: field_str_array(payload, "roles"),
            status: OperatorStatus::Active,
            revision: 1,
        }),
        "operator.role.granted" => {
            let mut snap = require(snapshot)?;
            let role = field_str(payload, "role")?.to_string();
            if !snap.roles.contains(&role) {
                snap.roles.push(role);
            }
            snap.revision += 1;
            Ok(snap)
        }
        "operator.role.revoked" => {
            let mut snap = require(snapshot)?;
            let role = field_str(payload, "role")?;
            snap.roles.retain(|r| r != role);
            snap.revision += 1;
            Ok(snap)
        }
        "operator.status.changed" => {
            let mut snap = require(snapshot)?;
            snap.status = match field_str(payload, "status")? {
                "active" => OperatorStatus::Active,
                "suspended" => OperatorStatus::Suspended,
                other => {
                    return Err(IdentityError::EventPayloadInvalid(format!(
                        "unknown operator status '{other}'"
                    )))
                }
            };
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(IdentityError::EventPayloadInvalid(format!(
            "unrecognized Operator event type '{other}'"
        ))),
    }
}

fn require(snapshot: Option<OperatorSnapshot>) -> Result<OperatorSnapshot, IdentityError> {
    snapshot.ok_or_else(|| {
        IdentityError::EventPayloadInvalid("event applied to a stream with no snapshot".into())
    })
}

fn field_str<'a>(v: &'a serde_json::Value, field: &str) -> Result<&'a str, IdentityError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| IdentityError::EventPayloadInvalid(format!("missing field '{field}'")))
}

fn field_str_array(v: &serde_json::Value, field: &str) -> Vec<String> {
    v.get(field)
        .and_then(serde_json::Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|x| x.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_types::{Actor, StreamId, StreamKind, TenantId, Timestamp};

    fn event(event_type: &str, payload: serde_json::Value) -> Event {
        Event {
            id: settld_types::EventId::from("evt_1".to_string()),
            stream_id: StreamId::from("operator_1".to_string()),
            stream_kind: StreamKind::Operator,
            event_type: event_type.to_string(),
            at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            actor: Actor::System {
                component: "test".to_string(),
            },
            payload,
            prev_chain_hash: None,
            chain_hash: "h".to_string(),
            signature: None,
            key_id: None,
            tenant_id: TenantId::default_tenant(),
        }
    }

    #[test]
    fn grant_then_revoke_role() {
        let reducer = OperatorReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "operator.registered",
                    serde_json::json!({"displayName": "Ops Team", "roles": []}),
                ),
            )
            .unwrap();
        assert!(!snap.has_role("finance_admin"));

        let snap = reducer
            .apply(
                Some(snap),
                &event("operator.role.granted", serde_json::json!({"role": "finance_admin"})),
            )
            .unwrap();
        assert!(snap.has_role("finance_admin"));

        let snap = reducer
            .apply(
                Some(snap),
                &event("operator.role.revoked", serde_json::json!({"role": "finance_admin"})),
            )
            .unwrap();
        assert!(!snap.has_role("finance_admin"));
    }
}
