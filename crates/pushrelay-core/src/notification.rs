//! The provider-agnostic notification payload.

use std::collections::HashMap;

use serde::Serialize;

/// Data key carrying the notification type (channel).
///
/// Client applications read this key by name; the `pushrelay.`
/// namespace is a stable contract and must not change.
pub const DATA_KEY_TYPE: &str = "pushrelay.type";

/// Data key carrying the requesting username.
///
/// Same stability contract as [`DATA_KEY_TYPE`].
pub const DATA_KEY_USERNAME: &str = "pushrelay.username";

/// A notification ready for delivery.
///
/// Built once per request by [`Notification::new`] and immutable
/// afterwards. Not persisted anywhere.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Alert title.
    pub title: String,
    /// Alert body.
    pub body: String,
    /// Target device registration token. May be empty — the handler
    /// short-circuits empty tokens before delivery.
    pub token: String,
    /// Android channel id for client-side grouping. Set only when the
    /// request supplied a non-empty type.
    pub channel_id: Option<String>,
    /// Custom data fields, always containing the two reserved
    /// `pushrelay.*` keys.
    pub data: HashMap<String, String>,
}

impl Notification {
    /// Build a notification from validated request fields.
    ///
    /// The reserved data keys are embedded unconditionally, even when
    /// `kind` or `username` is empty — clients rely on the keys being
    /// present. The channel id is set equal to `kind` only when
    /// non-empty.
    pub fn new(title: &str, body: &str, token: &str, kind: &str, username: &str) -> Self {
        let mut data = HashMap::new();
        let _ = data.insert(DATA_KEY_TYPE.to_string(), kind.to_string());
        let _ = data.insert(DATA_KEY_USERNAME.to_string(), username.to_string());

        Self {
            title: title.to_string(),
            body: body.to_string(),
            token: token.to_string(),
            channel_id: (!kind.is_empty()).then(|| kind.to_string()),
            data,
        }
    }
}
