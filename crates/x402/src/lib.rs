//! The `X402Gate` payment-gate subsystem (spec §4.5): the state machine,
//! its command-side validation, and the supporting concerns it leans on
//! (release-matrix computation, request-binding integrity, prompt-risk
//! enforcement, sponsor-wallet token verification).

pub mod binding;
pub mod error;
pub mod gate;
pub mod prompt_risk;
pub mod release_policy;
pub mod wallet_token;

pub use binding::{
    check_binding_evidence, check_prompt_risk_evidence, check_request_binding_evidence,
    RequestBinding,
};
pub use error::{agent_lifecycle_http_status, X402Error};
pub use gate::{
    decide_authorize, decide_create, decide_verify, AuthorizationRecord, AuthorizeInput,
    CreateGateInput, DelegationCheck, GateReducer, GateSnapshot, GateState, PromptRiskRecord,
    SettlementRecord, VerificationRecord, VerifyInput, VerifyOutcome,
};
pub use prompt_risk::{enforce_prompt_risk, evaluate_prompt_risk, ForceMode, PromptRiskOverride};
pub use release_policy::{
    compute_release, ReleaseMode, ReleaseOutcome, ReleasePolicy, ReleaseRule, VerificationStatus,
};
pub use wallet_token::{verify_wallet_authorization, WalletAuthorizationDecisionToken};
