//! Record ↔ batch conversion and Avro decode benchmark

use avro_flight_scorer::codec::{AvroCodec, Codec};
use avro_flight_scorer::convert::{batch_to_record, record_to_batch};
use avro_flight_scorer::record::{Record, Value};

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn create_test_record(fields: usize) -> Record {
    (0..fields)
        .map(|i| {
            let value = match i % 7 {
                0 => Value::Utf8(format!("applicant-{i}")),
                1 => Value::Float64(i as f64 * 1.5),
                2 => Value::Int32(i as i32),
                3 => Value::Boolean(i % 2 == 0),
                4 => Value::Binary(vec![i as u8; 16]),
                5 => Value::Float32(i as f32 / 3.0),
                _ => Value::Int64(i as i64 * 1_000),
            };
            (format!("field_{i:03}"), value)
        })
        .collect()
}

fn avro_schema(fields: usize) -> String {
    let fields: Vec<String> = (0..fields)
        .map(|i| {
            let kind = match i % 7 {
                0 => "string",
                1 => "double",
                2 => "int",
                3 => "boolean",
                4 => "bytes",
                5 => "float",
                _ => "long",
            };
            format!(r#"{{"name":"field_{i:03}","type":"{kind}"}}"#)
        })
        .collect();
    format!(
        r#"{{"type":"record","name":"Bench","fields":[{}]}}"#,
        fields.join(",")
    )
}

fn benchmark_record_to_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_to_batch");

    for fields in [7, 70, 700] {
        group.throughput(Throughput::Elements(fields as u64));
        let record = create_test_record(fields);

        group.bench_function(format!("{}_fields", fields), |b| {
            b.iter(|| {
                let _ = black_box(record_to_batch(black_box(&record)).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_batch_to_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_to_record");

    for fields in [7, 70, 700] {
        group.throughput(Throughput::Elements(fields as u64));
        let batch = record_to_batch(&create_test_record(fields)).unwrap();

        group.bench_function(format!("{}_fields", fields), |b| {
            b.iter(|| {
                let _ = black_box(batch_to_record(black_box(&batch)).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_avro_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("avro_decode");
    let codec = AvroCodec::new();

    for fields in [7, 70] {
        group.throughput(Throughput::Elements(fields as u64));
        let schema = avro_schema(fields);
        let payload = codec.encode(&schema, &create_test_record(fields)).unwrap();

        group.bench_function(format!("{}_fields", fields), |b| {
            b.iter(|| {
                let _ = black_box(codec.decode(&schema, black_box(&payload)).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_record_to_batch,
    benchmark_batch_to_record,
    benchmark_avro_decode,
);

criterion_main!(benches);
