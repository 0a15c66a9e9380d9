//! The `Robot` aggregate (spec §3 "Stream kinds and aggregates"): a
//! physical or simulated execution unit an `Agent` drives — distinct from
//! the agent's own software identity the same way the teacher's validator
//! node distinguishes a `ValidatorId` from the physical machine it runs on.
//! Thinner than [`crate::agent::AgentSnapshot`]: no wallet, just a lifecycle
//! and the agent it is currently bound to.

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::{AgentId, Event};

use crate::error::IdentityError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Active,
    Suspended,
    Decommissioned,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotSnapshot {
    pub robot_id: String,
    pub owner: String,
    pub bound_agent_id: Option<AgentId>,
    pub declared_capabilities: Vec<String>,
    pub status: RobotStatus,
    pub revision: u64,
}

impl RobotSnapshot {
    pub fn is_active(&self) -> bool {
        self.status == RobotStatus::Active
    }
}

/// Reduces `Robot` stream events (`registered`, `bound`, `unbound`,
/// `status.changed`) into a [`RobotSnapshot`].
#[derive(Default)]
pub struct RobotReducer;

impl Reducer for RobotReducer {
    type Snapshot = RobotSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_robot_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_robot_event(
    snapshot: Option<RobotSnapshot>,
    event: &Event,
) -> Result<RobotSnapshot, IdentityError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "robot.registered" => Ok(RobotSnapshot {
            robot_id: event.stream_id.as_str().to_string(),
            owner: field_str(payload, "owner")?.to_string(),
            bound_agent_id: None,
            declared_capabilities: field_str_array(payload, "declaredCapabilities"),
            status: RobotStatus::Active,
            revision: 1,
        }),
        "robot.bound" => {
            let mut snap = require(snapshot)?;
            snap.bound_agent_id = Some(AgentId::from(field_str(payload, "agentId")?.to_string()));
            snap.revision += 1;
            Ok(snap)
        }
        "robot.unbound" => {
            let mut snap = require(snapshot)?;
            snap.bound_agent_id = None;
            snap.revision += 1;
            Ok(snap)
        }
        "robot.status.changed" => {
            let mut snap = require(snapshot)?;
            snap.status = match field_str(payload, "status")? {
                "active" => RobotStatus::Active,
                "suspended" => RobotStatus::Suspended,
                "decommissioned" => RobotStatus::Decommissioned,
                other => {
                    return Err(IdentityError::EventPayloadInvalid(format!(
                        "unknown robot status '{other}'"
                    )))
                }
            };
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(IdentityError::EventPayloadInvalid(format!(
            "unrecognized Robot event type '{other}'"
        ))),
    }
}

fn require(snapshot: Option<RobotSnapshot>) -> Result<RobotSnapshot, IdentityError> {
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
