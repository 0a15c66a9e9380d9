//! Dispute and arbitration case state machines (spec §2 C9, §4.9).
//!
//! Two parallel aggregates — `DisputeCase` and `ArbitrationCase` — each
//! binding-evidence gated on every transition, plus the `x402_gate.*`
//! event payloads that fold a dispute's progress back into the gate it
//! concerns. The kernel appends one event to one stream per call, so a
//! cross-stream step (opening a dispute, escalating, resolving) is decided
//! here as a small bundle of payloads that the caller appends in sequence.

pub mod arbitration;
pub mod case;
pub mod error;

pub use arbitration::{
    decide_open_arbitration, decide_resolve_arbitration, ArbitrationCaseReducer,
    ArbitrationCaseSnapshot, ArbitrationCaseState, OpenArbitrationInput,
    ResolveArbitrationDecision, ResolveArbitrationInput, Verdict,
};
pub use case::{
    decide_escalate_dispute, decide_open_dispute, decide_submit_evidence,
    DisputeCaseReducer, DisputeCaseSnapshot, DisputeCaseState, EscalateDisputeDecision,
    EscalateDisputeInput, OpenDisputeDecision, OpenDisputeInput, SubmitEvidenceInput,
};
pub use error::DisputeError;
