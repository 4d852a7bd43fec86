//! Prometheus metrics recorder, `/metrics` rendering, and the outcome
//! counter sink.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use pushrelay_core::Outcome;

/// Notifications sent total (counter, labels: result).
pub const NOTIFICATIONS_SENT_TOTAL: &str = "notifications_sent_total";

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics`
/// endpoint. Must be called once at server startup before any metrics
/// are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// Counter of delivery outcomes.
///
/// Injected into the request handler so tests can assert on exact
/// increments without a live recorder.
pub trait OutcomeSink: Send + Sync {
    /// Count one resolved outcome.
    fn record(&self, outcome: Outcome);
}

/// Production sink: forwards to the `metrics` facade, which the
/// installed Prometheus recorder exposes on `/metrics`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusOutcomes;

impl OutcomeSink for PrometheusOutcomes {
    fn record(&self, outcome: Outcome) {
        metrics::counter!(NOTIFICATIONS_SENT_TOTAL, "result" => outcome.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_render() {
        // Build a recorder + handle (no global install to avoid test conflicts).
        let handle = PrometheusBuilder::new().build_recorder().handle();

        // Should produce valid (possibly empty) Prometheus text.
        let output = handle.render();
        assert!(output.is_empty() || output.contains('#') || output.contains('\n'));
    }

    #[test]
    fn recorded_outcomes_appear_in_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            PrometheusOutcomes.record(Outcome::EmptyToken);
            PrometheusOutcomes.record(Outcome::EmptyToken);
            PrometheusOutcomes.record(Outcome::Ok);
        });

        let output = handle.render();
        assert!(output.contains(NOTIFICATIONS_SENT_TOTAL));
        assert!(output.contains("result=\"EmptyToken\""));
        assert!(output.contains("result=\"Ok\""));
    }

    #[test]
    fn metric_constant_is_snake_case() {
        assert!(
            NOTIFICATIONS_SENT_TOTAL
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'),
            "metric name '{NOTIFICATIONS_SENT_TOTAL}' must be snake_case"
        );
    }
}
