//! Prompt-risk / taint enforcement at authorize time (spec §4.5): "A global
//! `forceMode` plus per-principal overrides plus the session provenance
//! taint state combine into a ternary outcome: `allow | challenge |
//! escalate`."

use serde::{Deserialize, Serialize};
use settld_identity::TaintState;

use crate::error::X402Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    Allow,
    Challenge,
    Escalate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptRiskOverride {
    pub enabled: bool,
    pub reason: String,
    pub ticket_ref: String,
}

/// Combines global policy, a per-principal override, and session taint into
/// one outcome (spec §4.5). Taint alone forces at least `challenge`; an
/// explicit `escalate` force mode (global or per-principal) always wins.
pub fn evaluate_prompt_risk(
    global_force_mode: ForceMode,
    per_principal_force_mode: Option<ForceMode>,
    taint: &TaintState,
) -> ForceMode {
    let effective = per_principal_force_mode.unwrap_or(global_force_mode);
    match effective {
        ForceMode::Escalate => ForceMode::Escalate,
        ForceMode::Challenge => ForceMode::Challenge,
        ForceMode::Allow => {
            if taint.is_tainted() {
                ForceMode::Challenge
            } else {
                ForceMode::Allow
            }
        }
    }
}

/// Applies `evaluate_prompt_risk`'s outcome to an authorize request,
/// honoring an explicit `promptRiskOverride` the way spec §4.5 describes:
/// "`challenge` and `escalate` block authorize ... unless the request
/// carries a `promptRiskOverride{enabled, reason, ticketRef}`, in which case
/// the override is recorded in the decision record."
pub fn enforce_prompt_risk(
    outcome: ForceMode,
    override_: Option<&PromptRiskOverride>,
) -> Result<(), X402Error> {
    let overridden = override_.map(|o| o.enabled).unwrap_or(false);
    if overridden {
        return Ok(());
    }
    match outcome {
        ForceMode::Allow => Ok(()),
        ForceMode::Challenge => Err(X402Error::PromptRiskForceChallenge),
        ForceMode::Escalate => Err(X402Error::PromptRiskForceEscalate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_session_allows_by_default() {
        let outcome = evaluate_prompt_risk(ForceMode::Allow, None, &TaintState::Clean);
        assert_eq!(outcome, ForceMode::Allow);
        enforce_prompt_risk(outcome, None).unwrap();
    }

    #[test]
    fn tainted_session_forces_at_least_challenge() {
        let taint = TaintState::Tainted { refs: vec![] };
        let outcome = evaluate_prompt_risk(ForceMode::Allow, None, &taint);
        assert_eq!(outcome, ForceMode::Challenge);
        let err = enforce_prompt_risk(outcome, None).unwrap_err();
        assert!(matches!(err, X402Error::PromptRiskForceChallenge));
    }

    #[test]
    fn override_unblocks_challenge() {
        let taint = TaintState::Tainted { refs: vec![] };
        let outcome = evaluate_prompt_risk(ForceMode::Allow, None, &taint);
        let override_ = PromptRiskOverride {
            enabled: true,
            reason: "reviewed manually".to_string(),
            ticket_ref: "TCK-1".to_string(),
        };
        enforce_prompt_risk(outcome, Some(&override_)).unwrap();
    }

    #[test]
    fn per_principal_override_beats_global_allow() {
        let outcome = evaluate_prompt_risk(
            ForceMode::Allow,
            Some(ForceMode::Escalate),
            &TaintState::Clean,
        );
        assert_eq!(outcome, ForceMode::Escalate);
    }
}
