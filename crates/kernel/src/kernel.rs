use dashmap::DashMap;
use serde_json::Value;
use settld_api::{
    IdempotencyRecord, RecordKind, SignerRegistry, Store, StoreOp, TxInput,
};
use settld_codec::sha256_hex_of_canon;
use settld_types::{Actor, Event, EventId, IdempotencyKey, StreamId, StreamKind, TenantId, Timestamp};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

use crate::config::KernelConfig;
use crate::dyn_reducer::DynReducer;
use crate::error::KernelError;

/// Inputs to [`EventKernel::append`] (spec §4.3).
pub struct AppendInput {
    pub tenant_id: TenantId,
    pub stream_id: StreamId,
    pub stream_kind: StreamKind,
    pub event_type: String,
    pub actor: Actor,
    pub payload: Value,
    pub at: Timestamp,
    pub expected_prev_chain_hash: Option<Option<String>>,
    /// Whether the route this append serves declares the event
    /// chain-sensitive (spec §4.3 (b)): if `true` and
    /// `expected_prev_chain_hash` is `None`, the append fails
    /// `MISSING_PRECONDITION` rather than silently racing.
    pub chain_sensitive: bool,
    pub idempotency_key: Option<IdempotencyKey>,
    /// Scopes an idempotency key to the specific route + request shape
    /// (spec invariant (vi): `(tenantId, idempotencyKey, routeBindingHash)`).
    pub route_binding_hash: String,
    pub signature: Option<String>,
    pub key_id: Option<settld_types::KeyId>,
}

pub struct AppendResult {
    pub event: Event,
    pub snapshot: Value,
    /// `true` if this call returned a memoized response rather than
    /// appending a new event (spec §4.3 step (a)).
    pub replayed: bool,
}

/// The event-sourced aggregate kernel (spec §2 C3, §4.3). Holds no domain
/// knowledge of any particular stream kind — reducers and the signer
/// registry are injected — so it can serialize writes uniformly across
/// every aggregate type.
pub struct EventKernel {
    store: Arc<dyn Store>,
    signer_registry: Arc<dyn SignerRegistry>,
    config: KernelConfig,
    /// Per-`(tenantId, streamId)` lock serializing the read-modify-write of
    /// a stream's chain head (spec §5).
    stream_locks: DashMap<(TenantId, StreamId), Arc<AsyncMutex<()>>>,
}

impl EventKernel {
    pub fn new(
        store: Arc<dyn Store>,
        signer_registry: Arc<dyn SignerRegistry>,
        config: KernelConfig,
    ) -> Self {
        Self {
            store,
            signer_registry,
            config,
            stream_locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    fn stream_lock(&self, tenant_id: &TenantId, stream_id: &StreamId) -> Arc<AsyncMutex<()>> {
        self.stream_locks
            .entry((tenant_id.clone(), stream_id.clone()))
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Fingerprints the parts of a request that must match for two calls
    /// sharing an idempotency key to count as the same request (spec §3
    /// invariant (vi)): which stream, which event type, and what payload.
    fn idempotency_fingerprint(input: &AppendInput) -> Result<String, KernelError> {
        let fingerprint_input = serde_json::json!({
            "streamId": input.stream_id.as_str(),
            "streamKind": input.stream_kind,
            "eventType": input.event_type,
            "payload": input.payload,
        });
        Ok(sha256_hex_of_canon(&fingerprint_input)?)
    }

    /// Appends one event to `input.stream_id`, reduces it into the stream's
    /// snapshot via `reducer`, and commits both atomically (spec §4.3).
    pub async fn append(
        &self,
        input: AppendInput,
        reducer: &dyn DynReducer,
    ) -> Result<AppendResult, KernelError> {
        // (a) idempotency replay.
        if let Some(key) = &input.idempotency_key {
            if let Some(memoized) = self
                .store
                .idempotency_get(&input.tenant_id, key, &input.route_binding_hash)
                .await?
            {
                let stored_fingerprint = memoized
                    .get("requestFingerprint")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        KernelError::EventPayloadInvalid("missing requestFingerprint".into())
                    })?;
                if stored_fingerprint != Self::idempotency_fingerprint(&input)? {
                    return Err(KernelError::IdempotencyConflict);
                }

                let event: Event = serde_json::from_value(
                    memoized
                        .get("event")
                        .cloned()
                        .ok_or_else(|| KernelError::EventPayloadInvalid("missing event".into()))?,
                )
                .map_err(settld_codec::CodecError::from)?;
                let snapshot = memoized
                    .get("snapshot")
                    .cloned()
                    .ok_or_else(|| KernelError::EventPayloadInvalid("missing snapshot".into()))?;
                return Ok(AppendResult {
                    event,
                    snapshot,
                    replayed: true,
                });
            }
        }

        let lock = self.stream_lock(&input.tenant_id, &input.stream_id);
        let _guard = lock.lock().await;

        // (b) optimistic concurrency.
        let head = self
            .store
            .stream_head(&input.tenant_id, input.stream_id.as_str())
            .await?;
        match &input.expected_prev_chain_hash {
            Some(expected) if *expected != head => {
                return Err(KernelError::ChainConflict {
                    expected: expected.clone(),
                    actual: head,
                });
            }
            None if input.chain_sensitive => {
                return Err(KernelError::MissingPrecondition);
            }
            _ => {}
        }

        // (c) compute chain hash; verify signature if present.
        let chain_input = Event::chain_hash_input(
            &head,
            &input.event_type,
            &input.at,
            &input.actor,
            &input.payload,
            &input.stream_id,
        );
        let chain_hash = sha256_hex_of_canon(&chain_input)?;

        if let (Some(signature), Some(key_id)) = (&input.signature, &input.key_id) {
            let outcome =
                self.signer_registry
                    .evaluate_lifecycle(&input.tenant_id, key_id.as_str(), input.at);
            if !outcome.is_ok() {
                return Err(KernelError::SignerLifecycle(outcome));
            }
            let verifying_key_hex = self
                .signer_registry
                .verifying_key_hex(&input.tenant_id, key_id.as_str())
                .ok_or(KernelError::SignerLifecycle(
                    settld_api::SignerLifecycleOutcome::NotRegistered,
                ))?;
            let verifying_key = settld_codec::VerifyingKey::from_hex(&verifying_key_hex)?;
            verifying_key.verify_bytes(chain_hash.as_bytes(), signature)?;
        }

        let event = Event {
            id: EventId::from(uuid::Uuid::new_v4().to_string()),
            stream_id: input.stream_id.clone(),
            stream_kind: input.stream_kind,
            event_type: input.event_type.clone(),
            at: input.at,
            actor: input.actor.clone(),
            payload: input.payload.clone(),
            prev_chain_hash: head.clone(),
            chain_hash,
            signature: input.signature.clone(),
            key_id: input.key_id.clone(),
            tenant_id: input.tenant_id.clone(),
        };

        // (d) reduce, then commit the event append + snapshot upsert +
        // idempotency memo as one transaction.
        let prior_snapshot = self
            .store
            .get(&input.tenant_id, RecordKind::Snapshot, input.stream_id.as_str())
            .await?;
        let snapshot = reducer
            .apply_json(prior_snapshot, &event)
            .map_err(|e| KernelError::EventPayloadInvalid(e.to_string()))?;

        let event_value = serde_json::to_value(&event).map_err(settld_codec::CodecError::from)?;

        let mut ops = vec![
            StoreOp {
                kind: RecordKind::Event,
                id: event.id.as_str().to_string(),
                value: event_value.clone(),
                idempotency: None,
            },
            StoreOp {
                kind: RecordKind::Snapshot,
                id: input.stream_id.as_str().to_string(),
                value: snapshot.clone(),
                idempotency: None,
            },
        ];

        if let Some(key) = &input.idempotency_key {
            let request_fingerprint = Self::idempotency_fingerprint(&input)?;
            let response = serde_json::json!({
                "event": &event_value,
                "snapshot": &snapshot,
                "requestFingerprint": request_fingerprint,
            });
            ops.push(StoreOp {
                kind: RecordKind::Idempotency,
                id: format!("{}:{}", key.as_str(), input.route_binding_hash),
                value: response.clone(),
                idempotency: Some(IdempotencyRecord {
                    key: key.clone(),
                    route_binding_hash: input.route_binding_hash.clone(),
                    response,
                }),
            });
        }

        self.store
            .commit_tx(TxInput {
                tenant_id: input.tenant_id.clone(),
                at: input.at,
                ops,
            })
            .await?;

        Ok(AppendResult {
            event,
            snapshot,
            replayed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_api::{CoordinatorError, Reducer, SignerLifecycleOutcome};
    use settld_storage::InMemoryStore;

    /// Folds every event's payload straight into the snapshot, so tests can
    /// assert on whatever shape they append without a real domain reducer.
    struct EchoReducer;

    impl Reducer for EchoReducer {
        type Snapshot = Value;

        fn apply(
            &self,
            _snapshot: Option<Self::Snapshot>,
            event: &Event,
        ) -> Result<Self::Snapshot, CoordinatorError> {
            Ok(event.payload.clone())
        }
    }

    /// No stream in these tests signs its events, so this registry's methods
    /// are never reached.
    struct NoSigners;

    impl SignerRegistry for NoSigners {
        fn verifying_key_hex(&self, _tenant_id: &TenantId, _key_id: &str) -> Option<String> {
            None
        }

        fn evaluate_lifecycle(
            &self,
            _tenant_id: &TenantId,
            _key_id: &str,
            _at: Timestamp,
        ) -> SignerLifecycleOutcome {
            SignerLifecycleOutcome::NotRegistered
        }
    }

    fn kernel() -> EventKernel {
        EventKernel::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(NoSigners),
            KernelConfig::default(),
        )
    }

    fn tenant() -> TenantId {
        TenantId::from("tenant_1".to_string())
    }

    fn at() -> Timestamp {
        Timestamp::parse("2026-01-01T00:00:00Z").unwrap()
    }

    fn append_input(payload: Value, idempotency_key: Option<IdempotencyKey>) -> AppendInput {
        AppendInput {
            tenant_id: tenant(),
            stream_id: StreamId::from("agent_1".to_string()),
            stream_kind: StreamKind::Agent,
            event_type: "agent.registered".to_string(),
            actor: Actor::System {
                component: "test".to_string(),
            },
            payload,
            at: at(),
            expected_prev_chain_hash: Some(None),
            chain_sensitive: true,
            idempotency_key,
            route_binding_hash: "POST /agents".to_string(),
            signature: None,
            key_id: None,
        }
    }

    #[tokio::test]
    async fn idempotent_replay_with_same_body_returns_memoized_response() {
        let kernel = kernel();
        let key = IdempotencyKey::from("idem_1".to_string());
        let payload = serde_json::json!({"agentId": "agent_1"});

        let first = kernel
            .append(append_input(payload.clone(), Some(key.clone())), &EchoReducer)
            .await
            .unwrap();
        assert!(!first.replayed);

        let second = kernel
            .append(append_input(payload, Some(key)), &EchoReducer)
            .await
            .unwrap();
        assert!(second.replayed);
        assert_eq!(first.event.id, second.event.id);
        assert_eq!(first.snapshot, second.snapshot);
    }

    #[tokio::test]
    async fn idempotent_replay_with_different_body_is_a_conflict() {
        let kernel = kernel();
        let key = IdempotencyKey::from("idem_2".to_string());

        kernel
            .append(
                append_input(serde_json::json!({"agentId": "agent_1"}), Some(key.clone())),
                &EchoReducer,
            )
            .await
            .unwrap();

        let err = kernel
            .append(
                append_input(serde_json::json!({"agentId": "agent_2"}), Some(key)),
                &EchoReducer,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::IdempotencyConflict));
    }
}
