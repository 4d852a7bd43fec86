//! # pushrelay-core
//!
//! Foundation types for the pushrelay notification relay.
//!
//! This crate provides the shared vocabulary the server and delivery
//! crates depend on:
//!
//! - **Payload**: [`notification::Notification`] — the provider-agnostic
//!   notification built once per request
//! - **Outcomes**: [`outcome::Outcome`] closed enum and the pure
//!   [`outcome::classify`] function mapping a delivery result to an
//!   outcome plus HTTP status
//! - **Errors**: [`error::DeliveryError`] — the tagged error abstraction
//!   delivery backends translate their raw failures into
//! - **Delivery seam**: [`deliver::Deliverer`] — the capability trait the
//!   request handler calls, implemented by `pushrelay-fcm`
//!
//! ## Crate Position
//!
//! Foundation crate. No HTTP, no provider code.

#![deny(unsafe_code)]

pub mod deliver;
pub mod error;
pub mod notification;
pub mod outcome;

pub use deliver::Deliverer;
pub use error::DeliveryError;
pub use notification::Notification;
pub use outcome::{Outcome, classify};
