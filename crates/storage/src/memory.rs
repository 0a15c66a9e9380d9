use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use settld_api::{IdempotencyRecord, ListFilter, RecordKind, Store, StoreError, StoreOp, TxInput};
use settld_types::{IdempotencyKey, TenantId};
use std::collections::BTreeMap;

type RecordMap = DashMap<(TenantId, RecordKind, String), Value>;
type StreamIndex = DashMap<(TenantId, String), Vec<String>>;
type IdempotencyMap = DashMap<(TenantId, String, String), Value>;

/// A process-local implementation of the Store port. All state lives in
/// `DashMap`s; `commit_tx` serializes writers through a single mutex so a
/// batch of ops either all land or none do, matching spec §4.2's "commits
/// all or none" even though the underlying maps are independently lock-free
/// for reads.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RecordMap,
    streams: StreamIndex,
    idempotency: IdempotencyMap,
    commit_lock: Mutex<()>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn append_only(kind: RecordKind) -> bool {
        matches!(
            kind,
            RecordKind::Event | RecordKind::LedgerEntry | RecordKind::SessionEvent
        )
    }

    fn validate_op(&self, tenant_id: &TenantId, op: &StoreOp) -> Result<(), StoreError> {
        if Self::append_only(op.kind) {
            let key = (tenant_id.clone(), op.kind, op.id.clone());
            if self.records.contains_key(&key) {
                return Err(StoreError::Conflict(format!(
                    "{} {} already exists",
                    op.kind.as_str(),
                    op.id
                )));
            }
        }
        if op.kind == RecordKind::Idempotency && op.idempotency.is_none() {
            return Err(StoreError::SchemaInvalid(
                "IDEMPOTENCY_PUT op missing idempotency record".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_op(&self, tenant_id: &TenantId, op: StoreOp) {
        if op.kind == RecordKind::Event {
            if let Some(stream_id) = op.value.get("streamId").and_then(Value::as_str) {
                self.streams
                    .entry((tenant_id.clone(), stream_id.to_string()))
                    .or_default()
                    .push(op.id.clone());
            }
        }
        if let Some(IdempotencyRecord {
            key,
            route_binding_hash,
            response,
        }) = op.idempotency.clone()
        {
            self.idempotency.insert(
                (tenant_id.clone(), key.as_str().to_string(), route_binding_hash),
                response,
            );
        }
        self.records
            .insert((tenant_id.clone(), op.kind, op.id), op.value);
    }

    fn matches_filter(value: &Value, filter: &ListFilter) -> Result<bool, StoreError> {
        for (field, expected) in &filter.equals {
            let actual = value.get(field).ok_or_else(|| {
                StoreError::SchemaInvalid(format!("unknown filter field '{field}'"))
            })?;
            if std::mem::discriminant(actual) != std::mem::discriminant(expected)
                && !(actual.is_number() && expected.is_number())
            {
                return Err(StoreError::SchemaInvalid(format!(
                    "filter field '{field}' type mismatch"
                )));
            }
            if actual != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn commit_tx(&self, input: TxInput) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock();
        for op in &input.ops {
            self.validate_op(&input.tenant_id, op)?;
        }
        for op in input.ops {
            self.apply_op(&input.tenant_id, op);
        }
        Ok(())
    }

    async fn get(
        &self,
        tenant_id: &TenantId,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        Ok(self
            .records
            .get(&(tenant_id.clone(), kind, id.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        kind: RecordKind,
        filter: ListFilter,
    ) -> Result<Vec<Value>, StoreError> {
        let mut matched: BTreeMap<String, Value> = BTreeMap::new();
        for entry in self.records.iter() {
            let (t, k, id) = entry.key();
            if t != tenant_id || *k != kind {
                continue;
            }
            if Self::matches_filter(entry.value(), &filter)? {
                matched.insert(id.clone(), entry.value().clone());
            }
        }
        let mut out: Vec<Value> = matched.into_values().collect();
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn idempotency_get(
        &self,
        tenant_id: &TenantId,
        key: &IdempotencyKey,
        route_binding_hash: &str,
    ) -> Result<Option<Value>, StoreError> {
        Ok(self
            .idempotency
            .get(&(
                tenant_id.clone(),
                key.as_str().to_string(),
                route_binding_hash.to_string(),
            ))
            .map(|r| r.value().clone()))
    }

    async fn stream_head(
        &self,
        tenant_id: &TenantId,
        stream_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let ids = self
            .streams
            .get(&(tenant_id.clone(), stream_id.to_string()));
        let Some(ids) = ids else { return Ok(None) };
        let Some(last_id) = ids.value().last() else {
            return Ok(None);
        };
        let event = self
            .records
            .get(&(tenant_id.clone(), RecordKind::Event, last_id.clone()))
            .ok_or_else(|| StoreError::Backend("stream index out of sync".to_string()))?;
        Ok(event
            .value()
            .get("chainHash")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn stream_events(
        &self,
        tenant_id: &TenantId,
        stream_id: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let Some(ids) = self.streams.get(&(tenant_id.clone(), stream_id.to_string())) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(ids.value().len());
        for id in ids.value() {
            if let Some(event) = self
                .records
                .get(&(tenant_id.clone(), RecordKind::Event, id.clone()))
            {
                out.push(event.value().clone());
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use settld_types::Timestamp;

    fn tenant() -> TenantId {
        TenantId::from("tenant_test".to_string())
    }

    #[tokio::test]
    async fn rejects_duplicate_event_append_in_same_stream() {
        let store = InMemoryStore::new();
        let at = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let op = StoreOp {
            kind: RecordKind::Event,
            id: "evt_1".to_string(),
            value: json!({"streamId": "run_1", "chainHash": "h1"}),
            idempotency: None,
        };
        store
            .commit_tx(TxInput {
                tenant_id: tenant(),
                at,
                ops: vec![op.clone()],
            })
            .await
            .unwrap();
        let err = store
            .commit_tx(TxInput {
                tenant_id: tenant(),
                at,
                ops: vec![op],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn stream_head_tracks_last_appended_event() {
        let store = InMemoryStore::new();
        let at = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        for (id, hash) in [("evt_1", "h1"), ("evt_2", "h2")] {
            store
                .commit_tx(TxInput {
                    tenant_id: tenant(),
                    at,
                    ops: vec![StoreOp {
                        kind: RecordKind::Event,
                        id: id.to_string(),
                        value: json!({"streamId": "run_1", "chainHash": hash}),
                        idempotency: None,
                    }],
                })
                .await
                .unwrap();
        }
        let head = store.stream_head(&tenant(), "run_1").await.unwrap();
        assert_eq!(head, Some("h2".to_string()));
    }

    #[tokio::test]
    async fn list_rejects_unknown_filter_field() {
        let store = InMemoryStore::new();
        let err = store
            .list(
                &tenant(),
                RecordKind::Gate,
                ListFilter::new().eq("bogusField", json!(true)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SchemaInvalid(_)));
    }

    #[tokio::test]
    async fn idempotency_replay_returns_memoized_response() {
        let store = InMemoryStore::new();
        let at = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let key = IdempotencyKey::from("idem_1".to_string());
        store
            .commit_tx(TxInput {
                tenant_id: tenant(),
                at,
                ops: vec![StoreOp {
                    kind: RecordKind::Idempotency,
                    id: "idem_1".to_string(),
                    value: json!({"ok": true}),
                    idempotency: Some(IdempotencyRecord {
                        key: key.clone(),
                        route_binding_hash: "route_a".to_string(),
                        response: json!({"ok": true, "gateId": "gate_1"}),
                    }),
                }],
            })
            .await
            .unwrap();
        let replayed = store
            .idempotency_get(&tenant(), &key, "route_a")
            .await
            .unwrap();
        assert_eq!(replayed, Some(json!({"ok": true, "gateId": "gate_1"})));
    }
}
