//! Type-erases [`settld_api::Reducer`] so the kernel can hold one reducer
//! per stream kind without a generic parameter threaded through every call
//! site. Domain crates write a typed `Reducer` (so their own tests work with
//! real structs); this blanket impl gives the kernel a JSON-in/JSON-out view
//! for free, matching the Store port's "snapshots are opaque JSON" shape.

use serde_json::Value;
use settld_api::{CoordinatorError, Reducer};
use settld_types::Event;

pub trait DynReducer: Send + Sync {
    fn apply_json(&self, snapshot: Option<Value>, event: &Event) -> Result<Value, CoordinatorError>;
}

impl<R> DynReducer for R
where
    R: Reducer,
{
    fn apply_json(&self, snapshot: Option<Value>, event: &Event) -> Result<Value, CoordinatorError> {
        let typed_snapshot = snapshot
            .map(serde_json::from_value)
            .transpose()
            .map_err(settld_codec::CodecError::from)?;
        let next = self.apply(typed_snapshot, event)?;
        Ok(serde_json::to_value(next).map_err(settld_codec::CodecError::from)?)
    }
}
