/// Validation failure of an inbound append request.
///
/// A rejected request never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// Body is not JSON, or is neither a record nor a collection of records.
    #[error("unsupported payload shape: {0}")]
    MalformedPayload(String),

    /// Record at `index` (position within the request) has no usable `offset`.
    #[error("record #{index}: missing or invalid offset")]
    MissingOffset { index: usize },
}

/// Rejected gap query. The store is never touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// `[watermark, upper]` holds more candidate offsets than one reply may carry.
    #[error("sync bound {upper} spans {span} offsets past watermark {watermark}, limit is {limit}")]
    SpanTooLarge {
        upper: u64,
        watermark: u64,
        span: u64,
        limit: u64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Prepend context to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
