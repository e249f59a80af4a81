use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::{DEFAULT_MAX_SYNC_SPAN, ReplogConfig};
use crate::delay::IngestDelay;
use crate::error::{EngineError, IngestError, SyncError};
use crate::ingest::{self, IngestSummary};
use crate::record::Record;
use crate::store::LogStore;

/// Point-in-time counters of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStatus {
    pub records: usize,
    pub watermark: u64,
    pub max_offset: Option<u64>,
}

/// Secondary replica: the log plus the simulated append latency.
///
/// Created once at startup and shared with every request handler.
/// Appends take the write guard for the whole batch; prefix and sync
/// reads take the read guard, so no reader sees a batch half applied.
/// Lock waits are unbounded. The critical sections never await, so
/// heavy write load only adds latency.
#[derive(Debug)]
pub struct Node {
    log: RwLock<LogStore>,
    delay: Arc<dyn IngestDelay>,
    max_sync_span: u64,
}

impl Node {
    pub fn new(delay: Arc<dyn IngestDelay>) -> Self {
        Self {
            log: RwLock::new(LogStore::new()),
            delay,
            max_sync_span: DEFAULT_MAX_SYNC_SPAN,
        }
    }

    /// Cap the number of candidate offsets a gap query may cover. Minimum 1.
    pub fn with_max_sync_span(mut self, limit: u64) -> Self {
        self.max_sync_span = limit.max(1);
        self
    }

    pub fn from_config(config: &ReplogConfig) -> Result<Self, EngineError> {
        Ok(Self::new(config.delay.build()?).with_max_sync_span(config.max_sync_span))
    }

    // --- Ingest path ---

    /// Validate and apply an already parsed append request, then wait out the delay.
    pub(crate) async fn ingest(&self, body: Value) -> Result<IngestSummary, IngestError> {
        let records = ingest::normalize(body)?;
        Ok(self.apply(records).await)
    }

    /// Validate and apply a raw append request body, then wait out the delay.
    pub async fn ingest_bytes(&self, body: &[u8]) -> Result<IngestSummary, IngestError> {
        let records = ingest::parse_body(body)?;
        Ok(self.apply(records).await)
    }

    async fn apply(&self, records: Vec<Record>) -> IngestSummary {
        let mut summary = IngestSummary {
            received: records.len(),
            ..Default::default()
        };

        {
            let mut log = self.log.write().await;
            for record in records {
                let offset = record.offset;
                if log.insert(record) {
                    summary.inserted += 1;
                    tracing::info!(offset, "record written");
                } else {
                    summary.duplicates += 1;
                    tracing::debug!(offset, "duplicate offset, already applied");
                }
            }
        }

        // Latency is simulated after the guard is dropped.
        let delay = self.delay.next_delay();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "delaying append response");
            tokio::time::sleep(delay).await;
        }

        summary
    }

    // --- Read path ---

    /// Contiguous prefix `0..watermark`.
    pub async fn prefix(&self) -> Vec<Record> {
        self.log.read().await.prefix()
    }

    // --- Sync path ---

    /// Offsets in `[0, upper]` this replica has not received.
    ///
    /// Fails without allocating when `[watermark, upper]` exceeds the
    /// configured span; the reply size is bounded by that span.
    pub async fn missing(&self, upper: u64) -> Result<Vec<u64>, SyncError> {
        let log = self.log.read().await;
        let watermark = log.watermark();
        if let Some(span) = upper.checked_sub(watermark) {
            // span + 1 candidates, compared without overflowing at u64::MAX.
            if span >= self.max_sync_span {
                return Err(SyncError::SpanTooLarge {
                    upper,
                    watermark,
                    span: span.saturating_add(1),
                    limit: self.max_sync_span,
                });
            }
        }
        Ok(log.missing(upper))
    }

    pub async fn status(&self) -> LogStatus {
        let log = self.log.read().await;
        LogStatus {
            records: log.len(),
            watermark: log.watermark(),
            max_offset: log.max_offset(),
        }
    }

    /// All stored records, including those beyond a gap.
    ///
    /// Diagnostic snapshot for tests and tooling; never served over HTTP,
    /// readers of the log go through [`Node::prefix`].
    pub async fn records(&self) -> Vec<Record> {
        self.log.read().await.records()
    }
}
