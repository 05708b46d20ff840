//! Metrics collection and exposition.
//!
//! # Metrics
//! - `responses_resolved_total` (counter): resolved responses by outcome, status
//! - `response_resolution_seconds` (histogram): handler plus resolution latency
//! - `response_serialization_fallbacks_total` (counter): bodies replaced by the fallback error
//! - `gateway_responses_total` (counter): platform responses by response type

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::gateway::ResponseType;
use crate::response::outcome::OutcomeKind;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_resolution(kind: OutcomeKind, status: u16, start: Instant) {
    counter!(
        "responses_resolved_total",
        "outcome" => kind.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("response_resolution_seconds", "outcome" => kind.as_str())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_serialization_fallback() {
    counter!("response_serialization_fallbacks_total").increment(1);
}

pub fn record_gateway_response(response_type: ResponseType) {
    counter!("gateway_responses_total", "response_type" => response_type.as_str()).increment(1);
}
