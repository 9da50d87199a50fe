use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder};

// Prometheus metrics (default registry)
pub static USER_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "user_directory_operations_total",
        "User operations handled, by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("register operations_total")
});

pub static STORE_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "user_directory_store_records",
        "Number of user records currently held by the store"
    )
    .expect("register store_records")
});

pub static STORE_FLUSHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "user_directory_store_flushes_total",
        "Store flushes to the backing file, by outcome",
        &["outcome"]
    )
    .expect("register store_flushes_total")
});

/// Count one finished operation; `outcome` is `ok` or an error class.
pub fn record_operation(operation: &str, outcome: &str) {
    USER_OPERATIONS_TOTAL.with_label_values(&[operation, outcome]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
