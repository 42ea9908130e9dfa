use autometrics::prometheus_exporter;

/// Must run before the first annotated function is hit.
pub fn init() {
    prometheus_exporter::init();
}

/// Body of `GET /metrics` in the Prometheus text format.
pub fn encode() -> String {
    match prometheus_exporter::encode_to_string() {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to encode metrics: {e:#}");
            String::new()
        }
    }
}
