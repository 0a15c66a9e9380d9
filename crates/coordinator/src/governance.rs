//! The `Governance` aggregate (spec §3): the single global stream holding
//! the default `forceMode` for prompt-risk enforcement (spec §4.5) and the
//! default release-policy matrix (spec §4.5 "Release matrix") that gates
//! fall back to when they don't carry their own `policyRef` override.
//! Unlike every other aggregate there is exactly one `Governance` stream per
//! tenant, so this reducer never needs to distinguish instances by id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::Event;
use settld_x402::{ForceMode, ReleasePolicy};

use crate::error::CoordinatorDomainError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub global_force_mode: ForceMode,
    pub per_principal_force_mode: HashMap<String, ForceMode>,
    pub default_release_policy: ReleasePolicy,
    pub revision: u64,
}

impl Default for GovernanceSnapshot {
    fn default() -> Self {
        Self {
            global_force_mode: ForceMode::Allow,
            per_principal_force_mode: HashMap::new(),
            default_release_policy: ReleasePolicy::auto_release_on_green_only(),
            revision: 0,
        }
    }
}

#[derive(Default)]
pub struct GovernanceReducer;

impl Reducer for GovernanceReducer {
    type Snapshot = GovernanceSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_governance_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_governance_event(
    snapshot: Option<GovernanceSnapshot>,
    event: &Event,
) -> Result<GovernanceSnapshot, CoordinatorDomainError> {
    let mut snap = snapshot.unwrap_or_default();
    let payload = &event.payload;
    match event.event_type.as_str() {
        "governance.force_mode_set" => {
            let mode = parse_force_mode(field_str(payload, "forceMode")?)?;
            match payload.get("principal").and_then(serde_json::Value::as_str) {
                Some(principal) => {
                    snap.per_principal_force_mode
                        .insert(principal.to_string(), mode);
                }
                None => snap.global_force_mode = mode,
            }
            snap.revision += 1;
            Ok(snap)
        }
        "governance.release_policy_set" => {
            snap.default_release_policy = serde_json::from_value(
                payload
                    .get("releasePolicy")
                    .cloned()
                    .ok_or_else(|| CoordinatorDomainError::EventPayloadInvalid(
                        "missing field 'releasePolicy'".to_string(),
                    ))?,
            )
            .map_err(|e| CoordinatorDomainError::EventPayloadInvalid(e.to_string()))?;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(CoordinatorDomainError::EventPayloadInvalid(format!(
            "unrecognized Governance event type '{other}'"
        ))),
    }
}

fn parse_force_mode(raw: &str) -> Result<ForceMode, CoordinatorDomainError> {
    match raw {
        "allow" => Ok(ForceMode::Allow),
        "challenge" => Ok(ForceMode::Challenge),
        "escalate" => Ok(ForceMode::Escalate),
        other => Err(CoordinatorDomainError::EventPayloadInvalid(format!(
            "unrecognized forceMode '{other}'"
        ))),
    }
}

fn field_str<'a>(v: &'a serde_json::Value, field: &str) -> Result<&'a str, CoordinatorDomainError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| CoordinatorDomainError::EventPayloadInvalid(format!("missing field '{field}'")))
}
