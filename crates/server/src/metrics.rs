use std::time::Instant;

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("licensing_requests_total", "Total HTTP requests handled")
        .expect("register requests_total")
});

pub static RESPONSES_BY_CLASS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("licensing_responses_total", "HTTP responses by status class", &["class"])
        .expect("register responses_total")
});

pub static REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "licensing_request_duration_seconds",
        "Request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register request_duration")
});

pub async fn track(req: Request, next: Next) -> Response {
    let started = Instant::now();
    REQUESTS_TOTAL.inc();
    let resp = next.run(req).await;
    REQUEST_DURATION.observe(started.elapsed().as_secs_f64());
    RESPONSES_BY_CLASS.with_label_values(&[status_class(resp.status())]).inc();
    resp
}

fn status_class(s: StatusCode) -> &'static str {
    match s.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

pub async fn metrics_handler() -> (StatusCode, String) {
    encode_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(status_class(StatusCode::OK), "2xx");
        assert_eq!(status_class(StatusCode::NOT_FOUND), "4xx");
        assert_eq!(status_class(StatusCode::BAD_GATEWAY), "5xx");
    }

    #[test]
    fn encode_includes_registered_counter() {
        REQUESTS_TOTAL.inc();
        let (code, body) = encode_metrics();
        assert_eq!(code, StatusCode::OK);
        assert!(body.contains("licensing_requests_total"));
    }
}
