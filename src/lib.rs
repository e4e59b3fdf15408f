//! # avro-flight-scorer
//!
//! Scores self-describing events against a remote model served over Arrow
//! Flight.
//!
//! An event arrives as an event-type identifier plus an Avro-encoded payload.
//! The identifier resolves (through a TTL cache) to the Avro schema stored in
//! object storage; the payload decodes into a generic [`record::Record`]; the
//! record becomes a single-row Arrow `RecordBatch` whose schema is inferred
//! from its values; the batch goes to the scoring engine over a Flight
//! `DoExchange` stream; and the engine's single-row answer comes back as a
//! record.
//!
//! ## Modules
//!
//! - [`record`]: dynamic records and scalar values
//! - [`convert`]: record ↔ Arrow conversion and the shared type mapping
//! - [`codec`]: schema-encoded payload codecs (Avro)
//! - [`registry`]: cached schema resolution backed by object storage
//! - [`scoring`]: Flight `DoExchange` scoring client
//! - [`pipeline`]: the per-event orchestration
//! - [`api`]: HTTP CloudEvents receiver used by the binary

pub mod api;
pub mod codec;
pub mod config;
pub mod convert;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod scoring;
pub mod telemetry;

mod error;

pub use error::{Error, Result};

/// Configuration for the scoring pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Schema registry configuration
    pub registry: registry::SchemaRegistryConfig,
    /// Scoring engine configuration
    pub scorer: scoring::ScorerConfig,
}

/// Re-exports for convenience
pub mod prelude {
    pub use crate::codec::{AvroCodec, Codec};
    pub use crate::convert::{batch_to_record, infer_schema, map_type, record_to_batch, ColumnType};
    pub use crate::pipeline::Pipeline;
    pub use crate::record::{Record, Value};
    pub use crate::registry::{SchemaRegistryConfig, SchemaResolver};
    pub use crate::scoring::{FlightScorer, Scorer, ScorerConfig};
    pub use crate::{Error, PipelineConfig, Result};
}
