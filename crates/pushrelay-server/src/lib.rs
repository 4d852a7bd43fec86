//! # pushrelay-server
//!
//! HTTP surface of the pushrelay notification relay.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `channels` | Immutable allow-list of notification types |
//! | `metrics` | Prometheus recorder, `/metrics` rendering, outcome sink |
//! | `send` | `POST /send` handler: validate → build → deliver → classify |
//! | `router` | Application state and route wiring |
//!
//! ## Data Flow
//!
//! `/send` → parameter validation → notification build → delivery via
//! the injected [`pushrelay_core::Deliverer`] → outcome classification →
//! response + counter + one structured log line.

#![deny(unsafe_code)]

pub mod channels;
pub mod metrics;
pub mod router;
pub mod send;

pub use channels::ChannelSet;
pub use metrics::{OutcomeSink, PrometheusOutcomes};
pub use router::{AppState, build_router};
