use lazy_static::lazy_static;
use prometheus::{
    HistogramVec, IntCounter, IntCounterVec, IntGauge, Encoder, TextEncoder,
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
};
use std::time::Instant;

use crate::{AnalyticsError, Result};

lazy_static! {
    // Request metrics
    pub static ref REQUEST_COUNTER: IntCounterVec = register_int_counter_vec!(
        "analytics_requests_total",
        "Total number of requests received",
        &["endpoint"]
    ).expect("register analytics_requests_total");

    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "analytics_request_duration_seconds",
        "Request duration in seconds",
        &["endpoint"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    ).expect("register analytics_request_duration_seconds");

    pub static ref INTERNAL_ERRORS: IntCounter = register_int_counter!(
        "analytics_internal_errors_total",
        "Total number of requests that failed with an internal error"
    ).expect("register analytics_internal_errors_total");

    // Aggregation metrics
    pub static ref REGIONS_SUMMARIZED: IntCounter = register_int_counter!(
        "analytics_regions_summarized_total",
        "Total number of region summaries computed"
    ).expect("register analytics_regions_summarized_total");

    pub static ref EMPTY_SUMMARIES: IntCounter = register_int_counter!(
        "analytics_empty_summaries_total",
        "Total number of region summaries with no contributing samples"
    ).expect("register analytics_empty_summaries_total");

    // Dataset metrics
    pub static ref DATASET_RECORDS: IntGauge = register_int_gauge!(
        "analytics_dataset_records",
        "Number of measurement records loaded at startup"
    ).expect("register analytics_dataset_records");
}

/// Force registration so every series shows up on the first scrape.
pub fn init_metrics() {
    lazy_static::initialize(&REQUEST_COUNTER);
    lazy_static::initialize(&REQUEST_DURATION);
    lazy_static::initialize(&INTERNAL_ERRORS);
    lazy_static::initialize(&REGIONS_SUMMARIZED);
    lazy_static::initialize(&EMPTY_SUMMARIES);
    lazy_static::initialize(&DATASET_RECORDS);
}

pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        REQUEST_COUNTER.with_label_values(&[endpoint]).inc();
        Self {
            endpoint,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        REQUEST_DURATION
            .with_label_values(&[self.endpoint])
            .observe(duration);
    }
}

pub fn record_summaries(total: usize, empty: usize) {
    REGIONS_SUMMARIZED.inc_by(total as u64);
    EMPTY_SUMMARIES.inc_by(empty as u64);
}

pub fn record_internal_error() {
    INTERNAL_ERRORS.inc();
}

pub fn set_dataset_records(count: usize) {
    DATASET_RECORDS.set(count as i64);
}

/// Text exposition of everything in the default registry.
pub fn render() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| AnalyticsError::Internal(format!("Failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| AnalyticsError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}
