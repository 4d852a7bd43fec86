//! Application state and route wiring.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::channels::ChannelSet;
use crate::metrics::{self, OutcomeSink};
use crate::send;
use pushrelay_core::Deliverer;

/// Shared state handed to every request handler.
///
/// The deliverer and outcome sink are trait objects so tests can
/// substitute fakes; the channel set is the explicit allow-list the
/// handler validates `type` against.
#[derive(Clone)]
pub struct AppState {
    /// Push-delivery backend.
    pub deliverer: Arc<dyn Deliverer>,
    /// Outcome counter.
    pub outcomes: Arc<dyn OutcomeSink>,
    /// Valid notification types.
    pub channels: Arc<ChannelSet>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

/// Build the application router.
///
/// Routes: `POST /send` (the relay), `GET /metrics` (Prometheus text
/// rendered from `handle`). The trace layer logs request/response
/// spans at the HTTP level.
pub fn build_router(state: AppState, handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/send", post(send::handle_send))
        .route("/metrics", get(move || async move { metrics::render(&handle) }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
