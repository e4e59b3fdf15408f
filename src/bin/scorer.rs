//! Avro Flight Scorer Binary
//!
//! Receives CloudEvents over HTTP and scores each one against the Flight
//! scoring engine.

use avro_flight_scorer::api;
use avro_flight_scorer::codec::AvroCodec;
use avro_flight_scorer::config::ComponentFactory;
use avro_flight_scorer::pipeline::Pipeline;
use avro_flight_scorer::registry::SchemaRegistryConfig;
use avro_flight_scorer::scoring::ScorerConfig;
use avro_flight_scorer::telemetry::Telemetry;
use avro_flight_scorer::{Error, PipelineConfig};

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

/// Avro Flight Scorer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HTTP port for the CloudEvents receiver
    #[arg(long, env = "PORT", default_value = "8080")]
    http_port: u16,

    /// Bucket holding event schemas
    #[arg(long, env = "S3_BUCKET", default_value = "event-schemas")]
    bucket: String,

    /// Key prefix of schema documents inside the bucket
    #[arg(long, env = "SCHEMA_PREFIX", default_value = "schemas")]
    schema_prefix: String,

    /// Seconds a fetched schema stays cached
    #[arg(long, env = "SCHEMA_TTL_SECS", default_value = "600")]
    schema_ttl_secs: u64,

    /// Maximum cached schemas
    #[arg(long, default_value = "10000")]
    schema_cache_entries: u64,

    /// Deadline for one schema fetch in milliseconds
    #[arg(long, default_value = "5000")]
    fetch_timeout_ms: u64,

    /// Flight endpoint of the scoring engine
    #[arg(long, env = "FLIGHT_ENDPOINT", default_value = "http://127.0.0.1:9998")]
    flight_endpoint: String,

    /// Deadline for one scoring exchange in milliseconds
    #[arg(long, default_value = "10000")]
    exchange_timeout_ms: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            registry: SchemaRegistryConfig {
                bucket: self.bucket.clone(),
                prefix: self.schema_prefix.clone(),
                ttl: Duration::from_secs(self.schema_ttl_secs),
                max_entries: self.schema_cache_entries,
                fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            },
            scorer: ScorerConfig {
                endpoint: self.flight_endpoint.clone(),
                exchange_timeout: Duration::from_millis(self.exchange_timeout_ms),
                ..Default::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let telemetry = Telemetry::init_for_component("avro-flight-scorer", &args.log_level)?;

    info!(service = telemetry.service_name(), "Starting Avro Flight Scorer");

    let config = args.pipeline_config();
    let object_store = ComponentFactory::create_object_store(&config.registry.bucket)?;
    let pipeline = Arc::new(Pipeline::connect(&config, object_store, Arc::new(AvroCodec::new())).await?);

    let router = api::build_http_router(pipeline);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.http_port));
    let listener = TcpListener::bind(addr).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    info!(
        http_port = args.http_port,
        bucket = %config.registry.bucket,
        flight_endpoint = %config.scorer.endpoint,
        schema_ttl_secs = args.schema_ttl_secs,
        "Scorer ready"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .await
        .map_err(|e| Error::Internal(format!("HTTP server error: {e}")))?;

    info!("Scorer shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    if *shutdown.borrow() {
        return;
    }
    let _ = shutdown.changed().await;
}
