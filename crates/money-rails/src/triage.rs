//! The reconciliation triage queue (spec §4.7): "one row per `triageKey =
//! hash(sourceType, mismatchType, mismatchKey)` with `{status, ownerPrincipalId,
//! notes, severity, revision}`; updates are idempotent on `(tenantId,
//! idempotencyKey)` and produce identical responses on replay."

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use settld_codec::sha256_hex;
use settld_types::TriageKey;

use crate::error::MoneyRailsError;
use crate::reconcile::MismatchType;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageSeverity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TriageRow {
    pub triage_key: TriageKey,
    pub status: TriageStatus,
    pub owner_principal_id: Option<String>,
    pub notes: Vec<String>,
    pub severity: TriageSeverity,
    pub revision: u64,
}

/// Deterministically derives `triageKey` from the mismatch's identifying
/// fields, so re-running a reconciliation pass maps back onto the same
/// triage row instead of creating duplicates.
pub fn compute_triage_key(
    source_type: &str,
    mismatch_type: MismatchType,
    mismatch_key: &str,
) -> Result<TriageKey, MoneyRailsError> {
    let input = format!("{source_type}:{mismatch_type:?}:{mismatch_key}");
    let hash = sha256_hex(input.as_bytes())?;
    Ok(TriageKey::from(hash))
}

pub struct TriageUpdate {
    pub status: Option<TriageStatus>,
    pub owner_principal_id: Option<String>,
    pub note: Option<String>,
    pub severity: Option<TriageSeverity>,
}

/// A `(tenantId, idempotencyKey)`-memoized triage-row store (spec §4.7).
/// `dashmap`-backed the same way the identity crate's signer registry is,
/// since both are in-process side tables the kernel's `Store` port does not
/// own directly.
#[derive(Default)]
pub struct TriageQueue {
    rows: DashMap<String, TriageRow>,
    applied_idempotency_keys: DashMap<String, TriageRow>,
}

impl TriageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TriageKey) -> Option<TriageRow> {
        self.rows.get(key.as_str()).map(|r| r.clone())
    }

    pub fn open_or_get(&self, key: TriageKey) -> TriageRow {
        self.rows
            .entry(key.as_str().to_string())
            .or_insert_with(|| TriageRow {
                triage_key: key.clone(),
                status: TriageStatus::Open,
                owner_principal_id: None,
                notes: Vec::new(),
                severity: TriageSeverity::Medium,
                revision: 1,
            })
            .clone()
    }

    /// Applies `update` to the row at `key`, memoized under `(tenant_id,
    /// idempotency_key)` — a replayed call with the same idempotency key
    /// returns the exact same row without reapplying the update.
    pub fn apply_update(
        &self,
        tenant_id: &str,
        idempotency_key: &str,
        key: TriageKey,
        update: TriageUpdate,
    ) -> Result<TriageRow, MoneyRailsError> {
        let memo_key = format!("{tenant_id}:{idempotency_key}");
        if let Some(memoized) = self.applied_idempotency_keys.get(&memo_key) {
            return Ok(memoized.clone());
        }

        let mut row = self
            .rows
            .get(key.as_str())
            .map(|r| r.clone())
            .ok_or_else(|| MoneyRailsError::TriageRowNotFound(key.as_str().to_string()))?;

        if let Some(status) = update.status {
            row.status = status;
        }
        if let Some(owner) = update.owner_principal_id {
            row.owner_principal_id = Some(owner);
        }
        if let Some(note) = update.note {
            row.notes.push(note);
        }
        if let Some(severity) = update.severity {
            row.severity = severity;
        }
        row.revision += 1;

        self.rows.insert(key.as_str().to_string(), row.clone());
        self.applied_idempotency_keys
            .insert(memo_key, row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_key_is_stable_for_same_mismatch() {
        let a = compute_triage_key("reconcile", MismatchType::AmountMismatch, "party_1").unwrap();
        let b = compute_triage_key("reconcile", MismatchType::AmountMismatch, "party_1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn replayed_update_with_same_idempotency_key_is_a_no_op() {
        let queue = TriageQueue::new();
        let key = compute_triage_key("reconcile", MismatchType::Missing, "party_1").unwrap();
        queue.open_or_get(key.clone());

        let first = queue
            .apply_update(
                "tenant_default",
                "idem_1",
                key.clone(),
                TriageUpdate {
                    status: Some(TriageStatus::InProgress),
                    owner_principal_id: Some("operator_a".to_string()),
                    note: Some("investigating".to_string()),
                    severity: None,
                },
            )
            .unwrap();
        assert_eq!(first.revision, 2);

        let replayed = queue
            .apply_update(
                "tenant_default",
                "idem_1",
                key,
                TriageUpdate {
                    status: Some(TriageStatus::Resolved),
                    owner_principal_id: None,
                    note: None,
                    severity: None,
                },
            )
            .unwrap();
        assert_eq!(replayed.revision, 2);
        assert_eq!(replayed.status, TriageStatus::InProgress);
    }
}
