//! # pushrelay-fcm
//!
//! Firebase Cloud Messaging delivery client.
//!
//! Implements the [`pushrelay_core::Deliverer`] seam against the FCM
//! HTTP v1 API:
//!
//! - **Credentials**: [`config::ServiceAccount`] loaded from a Google
//!   service account JSON file
//! - **Auth**: [`token::TokenProvider`] — RS256 JWT-bearer grant
//!   exchanged for a cached OAuth access token
//! - **Delivery**: [`client::FcmClient`] — `messages:send` call plus
//!   translation of Google error responses into tagged
//!   [`pushrelay_core::DeliveryError`] values at the boundary
//!
//! The raw provider error never leaves this crate; everything above
//! switches on the tag.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod token;

pub use client::FcmClient;
pub use config::{FcmError, ServiceAccount, load_service_account};
pub use token::TokenProvider;
