//! Schema registry telemetry instruments and recording helpers.

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::KeyValue;
use std::sync::OnceLock;

struct RegistryInstruments {
    lookups: Counter<u64>,
    fetches: Counter<u64>,
    fetch_duration_seconds: Histogram<f64>,
    cache_write_failures: Counter<u64>,
}

fn instruments() -> &'static RegistryInstruments {
    static INSTRUMENTS: OnceLock<RegistryInstruments> = OnceLock::new();
    INSTRUMENTS.get_or_init(|| {
        let meter = global::meter("scorer.registry");
        RegistryInstruments {
            lookups: meter
                .u64_counter("scorer.registry.cache.lookups")
                .with_description("Schema cache lookups by outcome (hit, miss, error)")
                .init(),
            fetches: meter
                .u64_counter("scorer.registry.fetches")
                .with_description("Remote schema fetches by outcome")
                .init(),
            fetch_duration_seconds: meter
                .f64_histogram("scorer.registry.fetch.duration")
                .with_description("Remote schema fetch latency")
                .with_unit("s")
                .init(),
            cache_write_failures: meter
                .u64_counter("scorer.registry.cache.write_failures")
                .with_description("Fetched schemas that could not be stored in the cache")
                .init(),
        }
    })
}

pub fn record_lookup(outcome: &'static str) {
    instruments()
        .lookups
        .add(1, &[KeyValue::new("outcome", outcome)]);
}

pub fn record_fetch(outcome: &'static str, duration_seconds: f64) {
    let i = instruments();
    let attrs = [KeyValue::new("outcome", outcome)];
    i.fetches.add(1, &attrs);
    i.fetch_duration_seconds.record(duration_seconds, &attrs);
}

pub fn record_cache_write_failure() {
    instruments().cache_write_failures.add(1, &[]);
}
