//! Provider billing/subscription ingestion (spec §2 C10, §4.10): signed
//! webhook verification, plan resolution, a retry policy and circuit
//! breaker shielding outbound provider calls, and dead-letter bookkeeping
//! for deliveries that exhaust retries.

pub mod circuit_breaker;
pub mod deadletter;
pub mod error;
pub mod plan;
pub mod retry;
pub mod webhook;

pub use circuit_breaker::CircuitBreaker;
pub use deadletter::{DeadLetterEntry, DeadLetterStore};
pub use error::BillingError;
pub use plan::{BillingInterval, Plan, PlanRegistry};
pub use retry::RetryPolicy;
pub use webhook::verify_webhook_signature;
