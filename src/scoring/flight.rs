//! Arrow Flight `DoExchange` scoring client

use super::{Scorer, ScorerConfig};
use crate::{Error, Result};

use arrow_array::RecordBatch;
use arrow_flight::decode::FlightRecordBatchStream;
use arrow_flight::error::FlightError;
use arrow_flight::flight_service_client::FlightServiceClient;
use arrow_flight::utils::batches_to_flight_data;
use arrow_flight::{FlightData, FlightDescriptor};
use async_trait::async_trait;
use futures::TryStreamExt;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

/// Scoring client that opens one `DoExchange` stream per call
///
/// Each call writes the batch's schema followed by the batch itself, closes
/// its side of the stream, and takes the first batch the engine sends back.
/// There are no retries.
#[derive(Debug, Clone)]
pub struct FlightScorer {
    client: FlightServiceClient<Channel>,
    descriptor: FlightDescriptor,
    exchange_timeout: Duration,
}

impl FlightScorer {
    /// Connect to the scoring engine described by `config`
    pub async fn connect(config: &ScorerConfig) -> Result<Self> {
        let endpoint = Endpoint::from_shared(config.endpoint.clone())
            .map_err(|e| {
                Error::Config(format!(
                    "invalid scoring endpoint '{}': {}",
                    config.endpoint, e
                ))
            })?
            .connect_timeout(config.connect_timeout);

        let channel = endpoint.connect().await.map_err(|e| {
            Error::Exchange(format!(
                "failed to connect to scoring engine at {}: {}",
                config.endpoint, e
            ))
        })?;

        Ok(Self::with_channel(channel, config))
    }

    /// Build a client over an existing channel
    pub fn with_channel(channel: Channel, config: &ScorerConfig) -> Self {
        Self {
            client: FlightServiceClient::new(channel),
            descriptor: FlightDescriptor::new_path(config.descriptor_path.clone()),
            exchange_timeout: config.exchange_timeout,
        }
    }

    async fn exchange(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let rows = batch.num_rows();
        let frames = encode_request(batch, &self.descriptor)?;
        debug!(rows, frames = frames.len(), "Opening scoring exchange");

        let mut client = self.client.clone();
        let response = client
            .do_exchange(futures::stream::iter(frames))
            .await
            .map_err(|status| {
                Error::Exchange(format!(
                    "exchange failed ({}): {}",
                    status.code(),
                    status.message()
                ))
            })?
            .into_inner();

        let mut batches =
            FlightRecordBatchStream::new_from_flight_data(response.map_err(FlightError::from));

        match batches.try_next().await {
            Ok(Some(scored)) => {
                debug!(
                    rows = scored.num_rows(),
                    columns = scored.num_columns(),
                    "Received scored batch"
                );
                Ok(scored)
            }
            Ok(None) => Err(Error::Exchange(
                "scoring engine closed the stream without a response batch".to_string(),
            )),
            Err(e) => Err(Error::Exchange(format!(
                "failed to read scoring response: {}",
                e
            ))),
        }
    }
}

#[async_trait]
impl Scorer for FlightScorer {
    async fn score(&self, batch: RecordBatch) -> Result<RecordBatch> {
        match tokio::time::timeout(self.exchange_timeout, self.exchange(batch)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation: "scoring exchange",
            }),
        }
    }
}

/// Encode `batch` as the outgoing exchange stream.
///
/// The first frame carries the schema and `descriptor`; the batch frames
/// follow. `batch` is consumed so its buffers go away with the frames.
pub fn encode_request(batch: RecordBatch, descriptor: &FlightDescriptor) -> Result<Vec<FlightData>> {
    let schema = batch.schema();
    let mut frames = batches_to_flight_data(schema.as_ref(), vec![batch])?;
    if let Some(first) = frames.first_mut() {
        first.flight_descriptor = Some(descriptor.clone());
    }
    Ok(frames)
}
