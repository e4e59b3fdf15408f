//! Pipeline telemetry instruments and recording helpers.

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::KeyValue;
use std::sync::OnceLock;

struct PipelineInstruments {
    events: Counter<u64>,
    event_duration_seconds: Histogram<f64>,
    stage_duration_seconds: Histogram<f64>,
    stage_failures: Counter<u64>,
}

fn instruments() -> &'static PipelineInstruments {
    static INSTRUMENTS: OnceLock<PipelineInstruments> = OnceLock::new();
    INSTRUMENTS.get_or_init(|| {
        let meter = global::meter("scorer.pipeline");
        PipelineInstruments {
            events: meter
                .u64_counter("scorer.pipeline.events")
                .with_description("Events processed by outcome")
                .init(),
            event_duration_seconds: meter
                .f64_histogram("scorer.pipeline.duration")
                .with_description("End-to-end event processing latency")
                .with_unit("s")
                .init(),
            stage_duration_seconds: meter
                .f64_histogram("scorer.pipeline.stage.duration")
                .with_description("Per-stage latency (resolve, decode, build, exchange, extract)")
                .with_unit("s")
                .init(),
            stage_failures: meter
                .u64_counter("scorer.pipeline.stage.failures")
                .with_description("Stage failures by stage and error class")
                .init(),
        }
    })
}

pub fn record_stage(stage: &'static str, error_class: Option<&'static str>, duration_seconds: f64) {
    let i = instruments();
    let attrs = [KeyValue::new("stage", stage)];
    i.stage_duration_seconds.record(duration_seconds, &attrs);
    if let Some(error_class) = error_class {
        i.stage_failures.add(
            1,
            &[
                KeyValue::new("stage", stage),
                KeyValue::new("error.class", error_class),
            ],
        );
    }
}

pub fn record_event(error_class: Option<&'static str>, duration_seconds: f64) {
    let i = instruments();
    let mut attrs = vec![KeyValue::new(
        "outcome",
        if error_class.is_some() { "error" } else { "ok" },
    )];
    if let Some(error_class) = error_class {
        attrs.push(KeyValue::new("error.class", error_class));
    }
    i.events.add(1, &attrs);
    i.event_duration_seconds.record(duration_seconds, &attrs);
}
