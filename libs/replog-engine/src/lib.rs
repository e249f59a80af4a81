//! Secondary side of a primary/secondary replicated log.
//!
//! The primary pushes offset-tagged records; this crate keeps them unique
//! and ordered, serves the contiguous prefix and reports gaps for catch-up.
//! State is in-memory only and is lost on restart.

pub mod config;
pub mod delay;
pub mod error;
pub mod ingest;
pub mod node;
pub mod record;
pub mod store;

pub use config::{DelayConfig, ReplogConfig};
pub use delay::{FixedDelay, IngestDelay, NoDelay, RandomDelay};
pub use error::{EngineError, IngestError, SyncError};
pub use ingest::IngestSummary;
pub use node::{LogStatus, Node};
pub use record::Record;
pub use store::LogStore;
