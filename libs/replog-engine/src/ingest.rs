use serde_json::{Map, Value};

use crate::error::IngestError;
use crate::record::{OFFSET_FIELD, Record};

/// Wrapper key of a batch append: `{"records": [...]}`.
pub const RECORDS_FIELD: &str = "records";

/// Outcome of one applied append request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records carried by the request.
    pub received: usize,
    /// Records newly added to the store.
    pub inserted: usize,
    /// Records absorbed as already applied.
    pub duplicates: usize,
}

/// Parse a raw request body into records.
pub fn parse_body(body: &[u8]) -> Result<Vec<Record>, IngestError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| IngestError::MalformedPayload(format!("invalid json: {e}")))?;
    normalize(value)
}

/// Normalize any accepted shape into the records it carries.
///
/// Accepted shapes:
/// - a record object (`{"offset": 0, ...}`)
/// - a wrapper (`{"records": [...]}`)
/// - a bare array of record objects
///
/// Every candidate is validated before anything is returned, so the
/// caller either gets the whole batch or an error.
pub fn normalize(value: Value) -> Result<Vec<Record>, IngestError> {
    match value {
        Value::Object(object) if object.contains_key(OFFSET_FIELD) => {
            Ok(vec![to_record(0, object)?])
        }
        Value::Object(mut object) => match object.remove(RECORDS_FIELD) {
            Some(Value::Array(items)) => from_items(items),
            Some(other) => Err(IngestError::MalformedPayload(format!(
                "'{RECORDS_FIELD}' must be an array, got {}",
                kind(&other)
            ))),
            None => Err(IngestError::MissingOffset { index: 0 }),
        },
        Value::Array(items) => from_items(items),
        other => Err(IngestError::MalformedPayload(format!(
            "expected record or record collection, got {}",
            kind(&other)
        ))),
    }
}

fn from_items(items: Vec<Value>) -> Result<Vec<Record>, IngestError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(object) => to_record(index, object),
            other => Err(IngestError::MalformedPayload(format!(
                "record #{index}: expected object, got {}",
                kind(&other)
            ))),
        })
        .collect()
}

fn to_record(index: usize, object: Map<String, Value>) -> Result<Record, IngestError> {
    Record::from_object(object).ok_or(IngestError::MissingOffset { index })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
