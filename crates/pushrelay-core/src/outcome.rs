//! Delivery outcome taxonomy and classification.
//!
//! Every `/send` request resolves to exactly one [`Outcome`], used both
//! as the metric label and to pick the HTTP response status.

use crate::error::DeliveryError;

/// Default HTTP status reported when a delivery error carries no
/// backend status (e.g. a transport failure).
const DEFAULT_ERROR_STATUS: u16 = 500;

/// The closed classification of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Delivery succeeded.
    Ok,
    /// The request supplied no device token; the backend was never
    /// called. Tracked so operators can measure recipients without a
    /// registered device.
    EmptyToken,
    /// The target registration token is no longer valid.
    Unregistered,
    /// The backend was transiently unavailable.
    Unavailable,
    /// The backend reported an internal fault.
    InternalError,
    /// The backend rejected the request as malformed.
    InvalidArgument,
    /// Any other failure.
    UnknownError,
}

impl Outcome {
    /// The stable name used as the `result` metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::EmptyToken => "EmptyToken",
            Self::Unregistered => "Unregistered",
            Self::Unavailable => "Unavailable",
            Self::InternalError => "InternalError",
            Self::InvalidArgument => "InvalidArgument",
            Self::UnknownError => "UnknownError",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a delivery result into an outcome and HTTP status.
///
/// Pure function over the token and the tagged error; checks run in
/// order and the first match wins:
///
/// 1. empty token → `EmptyToken`, 400 (the backend was never called)
/// 2. no error → `Ok`, 200
/// 3. otherwise the error tag picks the outcome, and the status is the
///    backend-carried one when present, else 500
pub fn classify(token: &str, error: Option<&DeliveryError>) -> (Outcome, u16) {
    if token.is_empty() {
        return (Outcome::EmptyToken, 400);
    }
    let Some(err) = error else {
        return (Outcome::Ok, 200);
    };
    let status = err.status().unwrap_or(DEFAULT_ERROR_STATUS);
    let outcome = match err {
        DeliveryError::Unregistered { .. } => Outcome::Unregistered,
        DeliveryError::Unavailable { .. } => Outcome::Unavailable,
        DeliveryError::Internal { .. } => Outcome::InternalError,
        DeliveryError::InvalidArgument { .. } => Outcome::InvalidArgument,
        DeliveryError::Other { .. } => Outcome::UnknownError,
    };
    (outcome, status)
}
