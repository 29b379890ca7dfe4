use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: booking attempts that were persisted.
pub const BOOKINGS_ACCEPTED_TOTAL: &str = "roomd_bookings_accepted_total";

/// Counter: booking attempts rejected. Labels: reason.
pub const BOOKINGS_REJECTED_TOTAL: &str = "roomd_bookings_rejected_total";

/// Counter: rooms created (single + bulk).
pub const ROOMS_CREATED_TOTAL: &str = "roomd_rooms_created_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Counter: documents replayed from the store log at startup.
pub const DOCS_REPLAYED_TOTAL: &str = "roomd_docs_replayed_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
