//! Event scoring pipeline
//!
//! One call to [`Pipeline::process`] handles one inbound event:
//!
//! 1. resolve the schema for the event type
//! 2. decode the payload into a [`Record`]
//! 3. build a single-row `RecordBatch`
//! 4. exchange it with the scoring engine
//! 5. extract the scored batch into a [`Record`]
//!
//! Stages run strictly in order and the first error ends the call. Calls
//! share nothing except the schema registry, so any number may run
//! concurrently.

mod telemetry;

use crate::codec::Codec;
use crate::convert::{batch_to_record, record_to_batch};
use crate::record::Record;
use crate::registry::{ObjectStoreSchemaStore, SchemaResolver};
use crate::scoring::{FlightScorer, Scorer};
use crate::{PipelineConfig, Result};

use object_store::ObjectStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span, Instrument};

/// Schema resolution, decoding, conversion and scoring for one event at a time
pub struct Pipeline {
    resolver: Arc<SchemaResolver>,
    codec: Arc<dyn Codec>,
    scorer: Arc<dyn Scorer>,
}

impl Pipeline {
    pub fn new(
        resolver: Arc<SchemaResolver>,
        codec: Arc<dyn Codec>,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            resolver,
            codec,
            scorer,
        }
    }

    /// Wire a pipeline from configuration: schemas from `object_store`,
    /// scoring over Flight.
    pub async fn connect(
        config: &PipelineConfig,
        object_store: Arc<dyn ObjectStore>,
        codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        let store = Arc::new(ObjectStoreSchemaStore::new(object_store));
        let resolver = Arc::new(SchemaResolver::new(&config.registry, store));
        let scorer = Arc::new(FlightScorer::connect(&config.scorer).await?);
        Ok(Self::new(resolver, codec, scorer))
    }

    pub fn resolver(&self) -> &Arc<SchemaResolver> {
        &self.resolver
    }

    /// Score one event and return the engine's output record
    pub async fn process(&self, event_type: &str, payload: &[u8]) -> Result<Record> {
        let start = Instant::now();
        let span = info_span!(
            "pipeline.process",
            event_type = event_type,
            payload_bytes = payload.len()
        );

        let result = self.run(event_type, payload).instrument(span).await;
        let error_class = result.as_ref().err().map(|e| e.class());
        telemetry::record_event(error_class, start.elapsed().as_secs_f64());
        result
    }

    async fn run(&self, event_type: &str, payload: &[u8]) -> Result<Record> {
        let schema = timed("resolve", self.resolver.resolve(event_type)).await?;
        let features = measured("decode", || self.codec.decode(&schema, payload))?;
        let batch = measured("build", || record_to_batch(&features))?;
        debug!(columns = batch.num_columns(), "Built feature batch");

        let scored = timed("exchange", self.scorer.score(batch)).await?;
        measured("extract", || batch_to_record(&scored))
    }
}

fn observe<T>(stage: &'static str, start: Instant, result: Result<T>) -> Result<T> {
    let error_class = result.as_ref().err().map(|e| e.class());
    telemetry::record_stage(stage, error_class, start.elapsed().as_secs_f64());
    result
}

fn measured<T>(stage: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    observe(stage, start, f())
}

async fn timed<T>(stage: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
    let start = Instant::now();
    let result = fut.await;
    observe(stage, start, result)
}
