//! Request metrics for the HTTP receiver.

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::KeyValue;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{field, info_span, Instrument};

struct RequestMetrics {
    requests: Counter<u64>,
    duration_seconds: Histogram<f64>,
    failures: Counter<u64>,
}

impl RequestMetrics {
    fn get() -> &'static Self {
        static METRICS: OnceLock<RequestMetrics> = OnceLock::new();
        METRICS.get_or_init(|| {
            let meter = global::meter("scorer.api.http");
            RequestMetrics {
                requests: meter
                    .u64_counter("http.server.request.count")
                    .with_description("Events and probes received over HTTP")
                    .init(),
                duration_seconds: meter
                    .f64_histogram("http.server.request.duration")
                    .with_description("Time from request arrival to response")
                    .with_unit("s")
                    .init(),
                failures: meter
                    .u64_counter("http.server.request.errors")
                    .with_description("Responses with a 4xx or 5xx status")
                    .init(),
            }
        })
    }

    fn observe(&self, method: String, route: String, status: u16, elapsed: Duration) {
        let attrs = [
            KeyValue::new("http.request.method", method),
            KeyValue::new("http.route", route),
            KeyValue::new("http.response.status_code", i64::from(status)),
        ];
        self.requests.add(1, &attrs);
        self.duration_seconds.record(elapsed.as_secs_f64(), &attrs);
        if status >= 400 {
            self.failures.add(1, &attrs);
        }
    }
}

/// Runs each request inside an `http.request` span and records its metrics
pub async fn http_observability_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => req.uri().path().to_string(),
    };

    let span = info_span!(
        "http.request",
        otel.kind = "server",
        http.request.method = %method,
        http.route = %route,
        http.response.status_code = field::Empty,
    );
    let response = next.run(req).instrument(span.clone()).await;

    let status = response.status().as_u16();
    span.record("http.response.status_code", status);
    RequestMetrics::get().observe(method, route, status, started.elapsed());

    response
}
