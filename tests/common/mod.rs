//! Shared fixtures for integration tests
//!
//! - [`ScoringPeer`]: an in-process Arrow Flight server standing in for the
//!   scoring engine
//! - [`CountingStore`]: schema store that counts fetches
//! - [`BrokenCache`]: cache backend whose every call fails

#![allow(dead_code)]

use avro_flight_scorer::registry::{SchemaCache, SchemaStore};
use avro_flight_scorer::{Error, Result};

use arrow_array::{ArrayRef, Float64Array, RecordBatch};
use arrow_flight::flight_service_server::{FlightService, FlightServiceServer};
use arrow_flight::utils::{batches_to_flight_data, flight_data_to_batches};
use arrow_flight::{
    Action, ActionType, Criteria, Empty, FlightData, FlightDescriptor, FlightInfo,
    HandshakeRequest, HandshakeResponse, PollInfo, PutResult, SchemaResult, Ticket,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use object_store::path::Path;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

type GrpcResult<T> = std::result::Result<T, Status>;
type GrpcStream<T> = Pin<Box<dyn Stream<Item = GrpcResult<T>> + Send + 'static>>;

/// Score the peer attaches in [`PeerMode::Score`]
pub const PEER_SCORE: f64 = 0.87;

/// How the peer answers a `DoExchange`
#[derive(Debug, Clone, Copy)]
pub enum PeerMode {
    /// Send the request batch back unchanged
    Echo,
    /// Send the request batch back with a `score` column appended
    Score,
    /// Close the response stream without sending anything
    Empty,
    /// Fail the call with `INTERNAL`
    Fail,
    /// Wait before answering like `Score`
    Stall(Duration),
}

/// What the peer saw on one exchange
#[derive(Debug, Clone)]
pub struct ReceivedExchange {
    pub descriptor: Option<FlightDescriptor>,
    pub batches: Vec<RecordBatch>,
}

#[derive(Clone)]
struct PeerService {
    mode: PeerMode,
    received: Arc<Mutex<Vec<ReceivedExchange>>>,
}

/// Flight scoring engine running on an ephemeral localhost port
pub struct ScoringPeer {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedExchange>>>,
    handle: JoinHandle<()>,
}

impl ScoringPeer {
    pub async fn start(mode: PeerMode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let service = PeerService {
            mode,
            received: received.clone(),
        };

        let handle = tokio::spawn(async move {
            Server::builder()
                .add_service(FlightServiceServer::new(service))
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await
                .unwrap();
        });

        Self {
            addr,
            received,
            handle,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<ReceivedExchange> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for ScoringPeer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn with_score(batch: &RecordBatch) -> std::result::Result<RecordBatch, Status> {
    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(Field::new("score", DataType::Float64, false));

    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    columns.push(Arc::new(Float64Array::from(vec![PEER_SCORE; batch.num_rows()])));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .map_err(|e| Status::internal(e.to_string()))
}

fn respond(batches: Vec<RecordBatch>) -> GrpcResult<Response<GrpcStream<FlightData>>> {
    let Some(first) = batches.first() else {
        let empty: GrpcStream<FlightData> = Box::pin(futures::stream::empty());
        return Ok(Response::new(empty));
    };
    let schema = first.schema();
    let frames = batches_to_flight_data(schema.as_ref(), batches)
        .map_err(|e| Status::internal(e.to_string()))?;
    let out: GrpcStream<FlightData> =
        Box::pin(futures::stream::iter(frames.into_iter().map(Ok)));
    Ok(Response::new(out))
}

#[tonic::async_trait]
impl FlightService for PeerService {
    type HandshakeStream = GrpcStream<HandshakeResponse>;
    type ListFlightsStream = GrpcStream<FlightInfo>;
    type DoGetStream = GrpcStream<FlightData>;
    type DoPutStream = GrpcStream<PutResult>;
    type DoExchangeStream = GrpcStream<FlightData>;
    type DoActionStream = GrpcStream<arrow_flight::Result>;
    type ListActionsStream = GrpcStream<ActionType>;

    async fn handshake(
        &self,
        _request: Request<Streaming<HandshakeRequest>>,
    ) -> GrpcResult<Response<Self::HandshakeStream>> {
        Err(Status::unimplemented("Handshake is not implemented"))
    }

    async fn list_flights(
        &self,
        _request: Request<Criteria>,
    ) -> GrpcResult<Response<Self::ListFlightsStream>> {
        Err(Status::unimplemented("ListFlights is not implemented"))
    }

    async fn get_flight_info(
        &self,
        _request: Request<FlightDescriptor>,
    ) -> GrpcResult<Response<FlightInfo>> {
        Err(Status::unimplemented("GetFlightInfo is not implemented"))
    }

    async fn poll_flight_info(
        &self,
        _request: Request<FlightDescriptor>,
    ) -> GrpcResult<Response<PollInfo>> {
        Err(Status::unimplemented("PollFlightInfo is not implemented"))
    }

    async fn get_schema(
        &self,
        _request: Request<FlightDescriptor>,
    ) -> GrpcResult<Response<SchemaResult>> {
        Err(Status::unimplemented("GetSchema is not implemented"))
    }

    async fn do_get(&self, _request: Request<Ticket>) -> GrpcResult<Response<Self::DoGetStream>> {
        Err(Status::unimplemented("DoGet is not implemented"))
    }

    async fn do_put(
        &self,
        _request: Request<Streaming<FlightData>>,
    ) -> GrpcResult<Response<Self::DoPutStream>> {
        Err(Status::unimplemented("DoPut is not implemented"))
    }

    async fn do_exchange(
        &self,
        request: Request<Streaming<FlightData>>,
    ) -> GrpcResult<Response<Self::DoExchangeStream>> {
        let mut stream = request.into_inner();
        let mut frames = Vec::new();
        while let Some(frame) = stream.next().await {
            frames.push(frame?);
        }

        let descriptor = frames.first().and_then(|f| f.flight_descriptor.clone());
        let batches =
            flight_data_to_batches(&frames).map_err(|e| Status::invalid_argument(e.to_string()))?;
        self.received.lock().unwrap().push(ReceivedExchange {
            descriptor,
            batches: batches.clone(),
        });

        match self.mode {
            PeerMode::Echo => respond(batches),
            PeerMode::Score => respond(
                batches
                    .iter()
                    .map(with_score)
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            ),
            PeerMode::Empty => respond(Vec::new()),
            PeerMode::Fail => Err(Status::internal("model unavailable")),
            PeerMode::Stall(delay) => {
                tokio::time::sleep(delay).await;
                respond(
                    batches
                        .iter()
                        .map(with_score)
                        .collect::<std::result::Result<Vec<_>, _>>()?,
                )
            }
        }
    }

    async fn do_action(
        &self,
        _request: Request<Action>,
    ) -> GrpcResult<Response<Self::DoActionStream>> {
        Err(Status::unimplemented("DoAction is not implemented"))
    }

    async fn list_actions(
        &self,
        _request: Request<Empty>,
    ) -> GrpcResult<Response<Self::ListActionsStream>> {
        Err(Status::unimplemented("ListActions is not implemented"))
    }
}

/// Schema store serving one document and counting fetches
pub struct CountingStore {
    body: Option<Bytes>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn serving(schema: &str) -> Self {
        Self {
            body: Some(Bytes::from(schema.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaStore for CountingStore {
    async fn fetch(&self, path: &Path) -> object_store::Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(object_store::Error::NotFound {
                path: path.to_string(),
                source: "no such schema".into(),
            }),
        }
    }
}

/// Cache backend that fails every read and write
pub struct BrokenCache;

#[async_trait]
impl SchemaCache for BrokenCache {
    async fn get(&self, _identifier: &str) -> Result<Option<Arc<str>>> {
        Err(Error::Cache("connection refused".to_string()))
    }

    async fn insert(&self, _identifier: &str, _schema: Arc<str>) -> Result<()> {
        Err(Error::Cache("connection refused".to_string()))
    }
}
