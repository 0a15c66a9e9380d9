//! Reconciliation (spec §4.7): "For a `(tenantId, period, providerId)`
//! triple, the reconciler computes expected payouts from `PayoutInstruction`
//! artifacts and compares with terminal rail events; each divergence is a
//! `ReconcileMismatch{mismatchType, mismatchKey, mismatchCode}`."

use serde::{Deserialize, Serialize};
use settld_types::{Cents, ProviderId};

use crate::operation::{MoneyRailOperationSnapshot, MoneyRailOperationState};

/// One expected payout, derived from a `PayoutInstruction` artifact (spec
/// §4.8) rather than re-derived here — the reconciler only compares.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpectedPayout {
    pub party_id: String,
    pub provider_id: ProviderId,
    pub amount_cents: Cents,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchType {
    /// Expected a payout, no terminal rail event was ever ingested.
    Missing,
    /// The rail terminated the operation in `failed` or `reversed` when a
    /// successful release was expected.
    Unsettled,
    /// The rail's confirmed/released amount differs from the expected one.
    AmountMismatch,
    /// A terminal rail event exists with no matching expected payout.
    Unexpected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcileMismatch {
    pub mismatch_type: MismatchType,
    pub mismatch_key: String,
    pub mismatch_code: String,
}

/// Compares `expected` payouts against the terminal state of `operations`
/// (keyed the same way — by `party_id`) and reports every divergence. Pure
/// and deterministic: identical inputs always produce identical mismatches,
/// in expected-list order then leftover-operations order.
pub fn reconcile(
    expected: &[ExpectedPayout],
    operations: &[MoneyRailOperationSnapshot],
) -> Vec<ReconcileMismatch> {
    let mut mismatches = Vec::new();
    let mut matched_operation_ids = std::collections::HashSet::new();

    for payout in expected {
        let matching = operations.iter().find(|op| {
            op.party_id.as_str() == payout.party_id && op.provider_id == payout.provider_id
        });
        match matching {
            None => mismatches.push(ReconcileMismatch {
                mismatch_type: MismatchType::Missing,
                mismatch_key: payout.party_id.clone(),
                mismatch_code: "RECONCILE_MISSING_PAYOUT".to_string(),
            }),
            Some(op) => {
                matched_operation_ids.insert(op.operation_id.as_str().to_string());
                match op.state {
                    MoneyRailOperationState::Released => {
                        if op.amount_cents != payout.amount_cents {
                            mismatches.push(ReconcileMismatch {
                                mismatch_type: MismatchType::AmountMismatch,
                                mismatch_key: payout.party_id.clone(),
                                mismatch_code: "RECONCILE_AMOUNT_MISMATCH".to_string(),
                            });
                        }
                    }
                    MoneyRailOperationState::Failed | MoneyRailOperationState::Reversed => {
                        mismatches.push(ReconcileMismatch {
                            mismatch_type: MismatchType::Unsettled,
                            mismatch_key: payout.party_id.clone(),
                            mismatch_code: "RECONCILE_UNSETTLED".to_string(),
                        });
                    }
                    MoneyRailOperationState::Initiated
                    | MoneyRailOperationState::Submitted
                    | MoneyRailOperationState::Confirmed => {
                        mismatches.push(ReconcileMismatch {
                            mismatch_type: MismatchType::Missing,
                            mismatch_key: payout.party_id.clone(),
                            mismatch_code: "RECONCILE_NOT_YET_TERMINAL".to_string(),
                        });
                    }
                }
            }
        }
    }

    for op in operations {
        if matched_operation_ids.contains(op.operation_id.as_str())
            || !matches!(
                op.state,
                MoneyRailOperationState::Released | MoneyRailOperationState::Reversed
            )
        {
            continue;
        }
        mismatches.push(ReconcileMismatch {
            mismatch_type: MismatchType::Unexpected,
            mismatch_key: op.operation_id.as_str().to_string(),
            mismatch_code: "RECONCILE_UNEXPECTED_OPERATION".to_string(),
        });
    }

    mismatches
}
