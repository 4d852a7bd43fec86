//! The delivery capability seam.

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::notification::Notification;

/// A push-delivery backend.
///
/// The request handler depends on this trait, never on a concrete
/// provider, so tests can substitute a recording fake. On success the
/// returned string is the provider-assigned receipt identifier,
/// echoed verbatim in the HTTP response.
#[async_trait]
pub trait Deliverer: Send + Sync {
    /// Deliver one notification.
    async fn deliver(&self, notification: &Notification) -> Result<String, DeliveryError>;
}
