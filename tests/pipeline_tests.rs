//! End-to-end event scoring
//!
//! Avro payloads resolved through an in-memory schema bucket, converted to
//! Arrow and scored by an in-process Flight peer.

mod common;

use avro_flight_scorer::codec::{AvroCodec, Codec};
use avro_flight_scorer::convert::{batch_to_record, build_batch, infer_schema, ColumnType};
use avro_flight_scorer::pipeline::Pipeline;
use avro_flight_scorer::record::{Record, Value};
use avro_flight_scorer::registry::SchemaRegistryConfig;
use avro_flight_scorer::scoring::ScorerConfig;
use avro_flight_scorer::{Error, PipelineConfig};
use common::{PeerMode, ScoringPeer, PEER_SCORE};

use arrow_schema::DataType;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::ObjectStore;
use std::sync::Arc;

const EVENT_TYPE: &str = "custom.loan-application";

const LOAN_SCHEMA: &str = r#"{
    "type": "record",
    "name": "LoanApplication",
    "fields": [
        {"name": "colA", "type": "string"},
        {"name": "colB", "type": "double"},
        {"name": "colC", "type": "int"},
        {"name": "colD", "type": "boolean"},
        {"name": "colE", "type": "bytes"},
        {"name": "colF", "type": "float"},
        {"name": "colG", "type": "long"}
    ]
}"#;

const TAGGED_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Tagged",
    "fields": [
        {"name": "id", "type": "string"},
        {"name": "tags", "type": {"type": "array", "items": "string"}}
    ]
}"#;

fn loan_application() -> Record {
    Record::new()
        .with("colA", "1000")
        .with("colB", 50000.0f64)
        .with("colC", 800i32)
        .with("colD", true)
        .with("colE", Value::Binary(vec![0x0A]))
        .with("colF", 1.0f32)
        .with("colG", 10000i64)
}

async fn pipeline_against(peer: &ScoringPeer) -> Pipeline {
    let memory = Arc::new(InMemory::new());
    memory
        .put(
            &Path::from(format!("schemas/{EVENT_TYPE}.json")),
            LOAN_SCHEMA.into(),
        )
        .await
        .unwrap();
    memory
        .put(&Path::from("schemas/custom.tagged.json"), TAGGED_SCHEMA.into())
        .await
        .unwrap();

    let config = PipelineConfig {
        registry: SchemaRegistryConfig::default(),
        scorer: ScorerConfig {
            endpoint: peer.endpoint(),
            ..Default::default()
        },
    };
    Pipeline::connect(&config, memory, Arc::new(AvroCodec::new()))
        .await
        .unwrap()
}

#[test]
fn test_seven_kind_record_round_trips_through_batch() {
    let record = loan_application();

    let schema = infer_schema(&record).unwrap();
    let tags: Vec<&DataType> = schema.fields().iter().map(|f| f.data_type()).collect();
    assert_eq!(
        tags,
        vec![
            &DataType::Utf8,
            &DataType::Float64,
            &DataType::Int32,
            &DataType::Boolean,
            &DataType::Binary,
            &DataType::Float32,
            &DataType::Int64,
        ]
    );
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(
        names,
        vec!["colA", "colB", "colC", "colD", "colE", "colF", "colG"]
    );

    let batch = build_batch(schema, &record).unwrap();
    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.num_columns(), 7);
    assert_eq!(batch_to_record(&batch).unwrap(), record);
}

#[test]
fn test_column_types_cover_each_kind_once() {
    let record = loan_application();
    let schema = infer_schema(&record).unwrap();
    for column_type in ColumnType::ALL {
        let matching = schema
            .fields()
            .iter()
            .filter(|f| f.data_type() == &column_type.data_type())
            .count();
        assert_eq!(matching, 1, "{column_type} should appear exactly once");
    }
}

#[tokio::test]
async fn test_event_is_scored_end_to_end() {
    let peer = ScoringPeer::start(PeerMode::Score).await;
    let pipeline = pipeline_against(&peer).await;

    let payload = AvroCodec::new()
        .encode(LOAN_SCHEMA, &loan_application())
        .unwrap();
    let scored = pipeline.process(EVENT_TYPE, &payload).await.unwrap();

    assert_eq!(scored.get("score"), Some(&Value::Float64(PEER_SCORE)));
    let mut expected = loan_application();
    expected.insert("score", PEER_SCORE);
    assert_eq!(scored, expected);

    let received = peer.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].batches[0].num_rows(), 1);
}

#[tokio::test]
async fn test_echoed_event_equals_decoded_payload() {
    let peer = ScoringPeer::start(PeerMode::Echo).await;
    let pipeline = pipeline_against(&peer).await;

    let payload = AvroCodec::new()
        .encode(LOAN_SCHEMA, &loan_application())
        .unwrap();
    let echoed = pipeline.process(EVENT_TYPE, &payload).await.unwrap();
    assert_eq!(echoed, loan_application());
}

#[tokio::test]
async fn test_unknown_event_type_never_reaches_engine() {
    let peer = ScoringPeer::start(PeerMode::Score).await;
    let pipeline = pipeline_against(&peer).await;

    let err = pipeline
        .process("custom.unregistered", &[0x00])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }), "got {err:?}");
    assert!(peer.received().is_empty());
}

#[tokio::test]
async fn test_unsupported_field_fails_before_exchange() {
    let peer = ScoringPeer::start(PeerMode::Score).await;
    let pipeline = pipeline_against(&peer).await;

    // id = "a", tags = ["x"]
    let payload = [0x02, b'a', 0x02, 0x02, b'x', 0x00];
    let err = pipeline
        .process("custom.tagged", &payload)
        .await
        .unwrap_err();
    match err {
        Error::UnsupportedType { field, kind } => {
            assert_eq!(field, "tags");
            assert_eq!(kind, "array");
        }
        other => panic!("expected unsupported type, got {other:?}"),
    }
    assert!(peer.received().is_empty());
}

#[tokio::test]
async fn test_engine_failure_surfaces_as_exchange_error() {
    let peer = ScoringPeer::start(PeerMode::Fail).await;
    let pipeline = pipeline_against(&peer).await;

    let payload = AvroCodec::new()
        .encode(LOAN_SCHEMA, &loan_application())
        .unwrap();
    let err = pipeline.process(EVENT_TYPE, &payload).await.unwrap_err();
    assert!(matches!(err, Error::Exchange(_)), "got {err:?}");
}

#[tokio::test]
async fn test_concurrent_events_share_one_schema_fetch_window() {
    let peer = ScoringPeer::start(PeerMode::Score).await;
    let pipeline = Arc::new(pipeline_against(&peer).await);

    // warm the cache so every concurrent event is a hit
    let codec = AvroCodec::new();
    let warmup = codec.encode(LOAN_SCHEMA, &loan_application()).unwrap();
    pipeline.process(EVENT_TYPE, &warmup).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10i64 {
        let pipeline = pipeline.clone();
        let record = loan_application().with("colG", i);
        let payload = codec.encode(LOAN_SCHEMA, &record).unwrap();
        handles.push(tokio::spawn(async move {
            pipeline.process(EVENT_TYPE, &payload).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let scored = handle.await.unwrap().unwrap();
        assert_eq!(scored.get("colG"), Some(&Value::Int64(i as i64)));
        assert_eq!(scored.get("score"), Some(&Value::Float64(PEER_SCORE)));
    }

    let stats = pipeline.resolver().stats();
    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.hits, 10);
    assert_eq!(peer.received().len(), 11);
}
