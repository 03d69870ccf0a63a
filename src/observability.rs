use std::net::SocketAddr;

// ── Request metrics ─────────────────────────────────────────────

/// Counter: per-table availability checks. Labels: result (available, conflict, occupied).
pub const CHECKS_TOTAL: &str = "seatwise_checks_total";

/// Histogram: end-to-end table search latency in seconds.
pub const SEARCH_DURATION_SECONDS: &str = "seatwise_search_duration_seconds";

/// Histogram: candidate tables evaluated per search.
pub const CANDIDATE_POOL_SIZE: &str = "seatwise_candidate_pool_size";

/// Counter: auto-assignment outcomes. Labels: outcome (assigned, none).
pub const AUTO_ASSIGN_TOTAL: &str = "seatwise_auto_assign_total";

// ── Store health ────────────────────────────────────────────────

/// Counter: store reads that missed their deadline.
pub const STORE_TIMEOUTS_TOTAL: &str = "seatwise_store_timeouts_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
