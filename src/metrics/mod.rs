//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Quotes issued and rejected
//! - Swap outcomes and durations
//! - Transfer fallbacks
//! - Record retention

use crate::error::SwapResult;
use crate::state::SwapStatus;

use axum::{http::StatusCode, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Encoder,
    Histogram, TextEncoder,
};
use std::net::SocketAddr;
use tracing::{error, info};

lazy_static! {
    pub static ref QUOTES: CounterVec = register_counter_vec!(
        "swapsim_quotes_total",
        "Total quotes issued by route kind",
        &["route"]
    ).unwrap();

    pub static ref QUOTE_REJECTIONS: CounterVec = register_counter_vec!(
        "swapsim_quote_rejections_total",
        "Total quote requests rejected",
        &["reason"]
    ).unwrap();

    pub static ref SWAPS_FINISHED: CounterVec = register_counter_vec!(
        "swapsim_swaps_finished_total",
        "Total swaps reaching a terminal status",
        &["status"]
    ).unwrap();

    pub static ref TRANSFER_FALLBACKS: Counter = register_counter!(
        "swapsim_transfer_fallbacks_total",
        "Origin transfers replaced by a placeholder after executor failure"
    ).unwrap();

    pub static ref SWAP_DURATION: Histogram = register_histogram!(
        "swapsim_swap_duration_seconds",
        "Wall-clock time from orchestration start to terminal status",
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    ).unwrap();

    pub static ref RECORDS_EVICTED: Counter = register_counter!(
        "swapsim_records_evicted_total",
        "Settled swap records removed by retention"
    ).unwrap();
}

/// Prometheus metrics server
pub struct MetricsServer {
    port: u16,
}

impl MetricsServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub async fn run(&self) -> SwapResult<()> {
        let app = Router::new().route("/metrics", get(metrics_handler));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting metrics server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::error::SwapError::Internal(format!("bind {}: {}", addr, e)))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| crate::error::SwapError::Internal(e.to_string()))?;

        Ok(())
    }
}

async fn metrics_handler() -> Result<String, StatusCode> {
    render().map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Encode all registered metrics in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// Helper functions to record metrics

pub fn record_quote(cross_chain: bool) {
    let route = if cross_chain { "cross_chain" } else { "same_chain" };
    QUOTES.with_label_values(&[route]).inc();
}

pub fn record_quote_rejected(reason: &str) {
    QUOTE_REJECTIONS.with_label_values(&[reason]).inc();
}

pub fn record_swap_finished(status: SwapStatus, duration_secs: f64) {
    SWAPS_FINISHED.with_label_values(&[status.as_str()]).inc();
    SWAP_DURATION.observe(duration_secs);
}

pub fn record_transfer_fallback() {
    TRANSFER_FALLBACKS.inc();
}

pub fn record_evictions(count: usize) {
    RECORDS_EVICTED.inc_by(count as f64);
}
