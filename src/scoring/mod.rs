//! Scoring exchange
//!
//! Sends one feature batch to the remote scoring engine and reads back one
//! scored batch. The production client speaks Arrow Flight `DoExchange`
//! ([`FlightScorer`]); the [`Scorer`] trait is the seam the pipeline depends on.

mod flight;

pub use flight::{encode_request, FlightScorer};

use crate::Result;

use arrow_array::RecordBatch;
use async_trait::async_trait;
use std::time::Duration;

/// Remote model scoring
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score one batch.
    ///
    /// Takes ownership of `batch`; its buffers are released once it has been
    /// written, or when the call fails or is dropped.
    async fn score(&self, batch: RecordBatch) -> Result<RecordBatch>;
}

/// Scoring engine connection settings
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// gRPC endpoint URI, e.g. `http://127.0.0.1:9998`
    pub endpoint: String,
    /// Deadline for establishing the channel
    pub connect_timeout: Duration,
    /// Deadline for one complete exchange (open, write, read)
    pub exchange_timeout: Duration,
    /// Path segments of the descriptor attached to the outgoing stream
    pub descriptor_path: Vec<String>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9998".to_string(),
            connect_timeout: Duration::from_secs(5),
            exchange_timeout: Duration::from_secs(10),
            descriptor_path: vec![String::new()],
        }
    }
}
