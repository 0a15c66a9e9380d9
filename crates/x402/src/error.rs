//! The x402 error catalog (spec §4.5, §6 "Error envelope"): every variant's
//! `.code()` is one of the stable strings published in
//! `docs/spec/x402-error-codes.v1.txt` (spec §6) so SDKs can match on code
//! rather than message text.

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum X402Error {
    #[error("gate {0} not found")]
    GateNotFound(String),

    #[error("gate {gate_id} is in state {state}, which does not accept this transition")]
    IllegalStateTransition { gate_id: String, state: String },

    #[error("amountCents {amount_cents} exceeds policy.maxAmountCents {max_amount_cents}")]
    AmountExceedsPolicy {
        amount_cents: i64,
        max_amount_cents: i64,
    },

    #[error("agent {0} is not active")]
    AgentNotActive(String),

    #[error("agent {0} is suspended")]
    AgentSuspended(String),

    #[error("agent {0} is throttled")]
    AgentThrottled(String),

    #[error("delegation grant {0} per-call spend limit exceeded")]
    DelegationGrantPerCallExceeded(String),

    #[error("delegation grant {0} total/daily spend limit exceeded")]
    DelegationGrantTotalExceeded(String),

    #[error("delegation grant {0} has been revoked")]
    DelegationGrantRevoked(String),

    #[error("prompt-risk policy forced a challenge")]
    PromptRiskForceChallenge,

    #[error("prompt-risk policy forced an escalation")]
    PromptRiskForceEscalate,

    #[error("sponsor wallet gate requires a WalletAuthorizationDecisionToken")]
    WalletIssuerDecisionRequired,

    #[error("wallet authorization decision token is invalid: {0}")]
    WalletIssuerDecisionInvalid(String),

    #[error("executionIntent is required for this gate")]
    ExecutionIntentRequired,

    #[error("executionIntent idempotency key does not match a prior request")]
    ExecutionIntentIdempotencyMismatch,

    #[error("executionIntent conflicts with the gate's recorded intent")]
    ExecutionIntentConflict,

    #[error("evidenceRefs is missing the request/response binding hashes")]
    RequestBindingEvidenceRequired,

    #[error("evidenceRefs request/response binding hashes do not match the authorize-time binding")]
    RequestBindingEvidenceMismatch,

    #[error("evidenceRefs is missing {0:?}, required because the gate's session was tainted at authorize time")]
    PromptRiskEvidenceRequired(Vec<String>),

    #[error("downstream action is missing bindingEvidence for gate {0}")]
    BindingEvidenceRequired(String),

    #[error("downstream action's bindingEvidence does not match gate {0}'s request binding")]
    BindingEvidenceMismatch(String),

    #[error("event payload failed validation: {0}")]
    EventPayloadInvalid(String),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for X402Error {
    fn code(&self) -> &'static str {
        match self {
            X402Error::GateNotFound(_) => "X402_GATE_NOT_FOUND",
            X402Error::IllegalStateTransition { .. } => "X402_GATE_ILLEGAL_STATE_TRANSITION",
            X402Error::AmountExceedsPolicy { .. } => "X402_AMOUNT_EXCEEDS_POLICY",
            X402Error::AgentNotActive(_) => "X402_AGENT_NOT_ACTIVE",
            X402Error::AgentSuspended(_) => "X402_AGENT_SUSPENDED",
            X402Error::AgentThrottled(_) => "X402_AGENT_THROTTLED",
            X402Error::DelegationGrantPerCallExceeded(_) => {
                "X402_DELEGATION_GRANT_PER_CALL_EXCEEDED"
            }
            X402Error::DelegationGrantTotalExceeded(_) => {
                "X402_DELEGATION_GRANT_TOTAL_EXCEEDED"
            }
            X402Error::DelegationGrantRevoked(_) => "X402_DELEGATION_GRANT_REVOKED",
            X402Error::PromptRiskForceChallenge => "X402_PROMPT_RISK_FORCE_CHALLENGE",
            X402Error::PromptRiskForceEscalate => "X402_PROMPT_RISK_FORCE_ESCALATE",
            X402Error::WalletIssuerDecisionRequired => "X402_WALLET_ISSUER_DECISION_REQUIRED",
            X402Error::WalletIssuerDecisionInvalid(_) => "X402_WALLET_ISSUER_DECISION_INVALID",
            X402Error::ExecutionIntentRequired => "X402_EXECUTION_INTENT_REQUIRED",
            X402Error::ExecutionIntentIdempotencyMismatch => {
                "X402_EXECUTION_INTENT_IDEMPOTENCY_MISMATCH"
            }
            X402Error::ExecutionIntentConflict => "X402_EXECUTION_INTENT_CONFLICT",
            X402Error::RequestBindingEvidenceRequired => {
                "X402_REQUEST_BINDING_EVIDENCE_REQUIRED"
            }
            X402Error::RequestBindingEvidenceMismatch => {
                "X402_REQUEST_BINDING_EVIDENCE_MISMATCH"
            }
            X402Error::PromptRiskEvidenceRequired(_) => "X402_PROMPT_RISK_EVIDENCE_REQUIRED",
            X402Error::BindingEvidenceRequired(_) => "X402_BINDING_EVIDENCE_REQUIRED",
            X402Error::BindingEvidenceMismatch(_) => "X402_BINDING_EVIDENCE_MISMATCH",
            X402Error::EventPayloadInvalid(_) => "EVENT_PAYLOAD_INVALID",
            X402Error::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            X402Error::GateNotFound(_) => ErrorClass::Precondition,
            X402Error::IllegalStateTransition { .. } => ErrorClass::Conflict,
            X402Error::AmountExceedsPolicy { .. } => ErrorClass::Policy,
            X402Error::AgentNotActive(_) | X402Error::AgentSuspended(_) => ErrorClass::Conflict,
            X402Error::AgentThrottled(_) => ErrorClass::Policy,
            X402Error::DelegationGrantPerCallExceeded(_)
            | X402Error::DelegationGrantTotalExceeded(_)
            | X402Error::DelegationGrantRevoked(_)
            | X402Error::PromptRiskForceChallenge
            | X402Error::PromptRiskForceEscalate
            | X402Error::WalletIssuerDecisionRequired
            | X402Error::WalletIssuerDecisionInvalid(_) => ErrorClass::Policy,
            X402Error::ExecutionIntentRequired
            | X402Error::ExecutionIntentIdempotencyMismatch
            | X402Error::ExecutionIntentConflict => ErrorClass::Conflict,
            X402Error::RequestBindingEvidenceRequired
            | X402Error::RequestBindingEvidenceMismatch
            | X402Error::PromptRiskEvidenceRequired(_)
            | X402Error::BindingEvidenceRequired(_)
            | X402Error::BindingEvidenceMismatch(_) => ErrorClass::Integrity,
            X402Error::EventPayloadInvalid(_) => ErrorClass::Schema,
            X402Error::Codec(_) => ErrorClass::Integrity,
        }
    }
}

/// The HTTP status spec §4.5 names for the agent-lifecycle variants
/// (`409/410/429`), kept as a small mapping function rather than baked into
/// [`ErrorClass`] since it's specific to these three variants, not the whole
/// taxonomy.
pub fn agent_lifecycle_http_status(err: &X402Error) -> Option<u16> {
    match err {
        X402Error::AgentNotActive(_) => Some(409),
        X402Error::AgentSuspended(_) => Some(410),
        X402Error::AgentThrottled(_) => Some(429),
        _ => None,
    }
}
