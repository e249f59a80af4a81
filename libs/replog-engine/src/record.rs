use serde::Serialize;
use serde_json::{Map, Value};

/// Name of the identity field, shared by every endpoint.
pub const OFFSET_FIELD: &str = "offset";

/// Replicated log entry. The engine only knows `offset`.
/// `payload` is every other field of the inbound object; it is never inspected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Position in the primary's sequence — identity of the record.
    pub offset: u64,
    /// Opaque fields, emitted next to `offset` on reads.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Record {
    pub fn new(offset: u64, payload: Map<String, Value>) -> Self {
        Self { offset, payload }
    }

    /// Record without payload fields.
    pub fn bare(offset: u64) -> Self {
        Self::new(offset, Map::new())
    }

    /// Split an inbound JSON object into offset + payload.
    ///
    /// Returns `None` when `offset` is absent or not a non-negative integer.
    pub fn from_object(mut object: Map<String, Value>) -> Option<Self> {
        let offset = object.remove(OFFSET_FIELD)?.as_u64()?;
        Some(Self::new(offset, object))
    }
}
