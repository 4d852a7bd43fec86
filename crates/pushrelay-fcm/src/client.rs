//! FCM HTTP v1 delivery client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{FcmError, ServiceAccount};
use crate::token::TokenProvider;
use pushrelay_core::{Deliverer, DeliveryError, Notification};

/// Production FCM API base URL.
const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Successful `messages:send` response.
#[derive(Debug, Deserialize)]
struct SendResponse {
    /// Message name, `projects/<project>/messages/<id>`. This is the
    /// delivery receipt.
    name: String,
}

/// FCM delivery client.
///
/// Holds the OAuth token provider and the HTTP client; one instance is
/// shared across all request handlers.
pub struct FcmClient {
    project_id: String,
    endpoint: String,
    tokens: TokenProvider,
    client: reqwest::Client,
}

impl std::fmt::Debug for FcmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FcmClient")
            .field("project_id", &self.project_id)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl FcmClient {
    /// Create a client from service account credentials.
    ///
    /// Parses the private key and builds the HTTP client up front, so
    /// bad credentials fail at startup rather than on first send.
    pub fn new(account: &ServiceAccount) -> Result<Self, FcmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FcmError::ClientBuild {
                reason: e.to_string(),
            })?;

        let tokens = TokenProvider::new(account, client.clone())?;

        info!(
            project_id = %account.project_id,
            client_email = %account.client_email,
            "FCM client initialized"
        );

        Ok(Self {
            project_id: account.project_id.clone(),
            endpoint: FCM_ENDPOINT.to_string(),
            tokens,
            client,
        })
    }

    /// Override the API base URL (tests point this at a local server).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Build the `messages:send` request body.
    fn build_message(notification: &Notification) -> serde_json::Value {
        let mut message = serde_json::json!({
            "token": notification.token,
            "notification": {
                "title": notification.title,
                "body": notification.body,
            },
            "data": notification.data,
        });

        if let Some(ref channel_id) = notification.channel_id {
            message["android"] = serde_json::json!({
                "notification": { "channel_id": channel_id },
            });
        }

        serde_json::json!({ "message": message })
    }
}

#[async_trait]
impl Deliverer for FcmClient {
    async fn deliver(&self, notification: &Notification) -> Result<String, DeliveryError> {
        let access_token = self.tokens.access_token().await?;

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        );
        let payload = Self::build_message(notification);

        let result = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&payload)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, url = %url, "FCM request failed (transport error)");
                return Err(DeliveryError::Other {
                    status: None,
                    message: e.to_string(),
                });
            }
        };

        let status = response.status().as_u16();
        if response.status().is_success() {
            let sent: SendResponse =
                response.json().await.map_err(|e| DeliveryError::Other {
                    status: Some(status),
                    message: format!("malformed send response: {e}"),
                })?;
            info!(status, receipt = %sent.name, "FCM send OK");
            return Ok(sent.name);
        }

        let body = response.text().await.unwrap_or_default();
        let err = translate_error(status, &body);
        warn!(status, error = %err, "FCM send FAILED");
        Err(err)
    }
}

/// Translate an FCM error response into a tagged [`DeliveryError`].
///
/// The v1 API reports failures as
/// `{"error": {"code", "status", "message", "details": [...]}}` where
/// one detail entry may carry an FCM-specific `errorCode` (e.g.
/// `UNREGISTERED`). The FCM code is more precise than the google.rpc
/// status, so it is checked first.
fn translate_error(status: u16, body: &str) -> DeliveryError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or(body)
        .to_string();

    let fcm_code = error
        .and_then(|e| e.get("details"))
        .and_then(serde_json::Value::as_array)
        .and_then(|details| {
            details
                .iter()
                .find_map(|d| d.get("errorCode").and_then(serde_json::Value::as_str))
        });

    let rpc_status = error
        .and_then(|e| e.get("status"))
        .and_then(serde_json::Value::as_str);

    let status = Some(status);
    match fcm_code.or(rpc_status) {
        Some("UNREGISTERED" | "NOT_FOUND") => DeliveryError::Unregistered { status, message },
        Some("UNAVAILABLE" | "QUOTA_EXCEEDED") => DeliveryError::Unavailable { status, message },
        Some("INTERNAL") => DeliveryError::Internal { status, message },
        Some("INVALID_ARGUMENT" | "SENDER_ID_MISMATCH") => {
            DeliveryError::InvalidArgument { status, message }
        }
        _ => DeliveryError::Other { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn error_body(code: u16, rpc_status: &str, fcm_code: Option<&str>) -> String {
        let mut error = serde_json::json!({
            "code": code,
            "status": rpc_status,
            "message": format!("{rpc_status} from backend"),
        });
        if let Some(fcm) = fcm_code {
            error["details"] = serde_json::json!([{
                "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                "errorCode": fcm,
            }]);
        }
        serde_json::json!({ "error": error }).to_string()
    }

    #[test]
    fn unregistered_via_fcm_error_code() {
        let body = error_body(404, "NOT_FOUND", Some("UNREGISTERED"));
        let err = translate_error(404, &body);
        assert_matches!(
            err,
            DeliveryError::Unregistered {
                status: Some(404),
                ..
            }
        );
    }

    #[test]
    fn unregistered_via_rpc_status_alone() {
        let body = error_body(404, "NOT_FOUND", None);
        assert_matches!(
            translate_error(404, &body),
            DeliveryError::Unregistered { .. }
        );
    }

    #[test]
    fn unavailable_and_quota_exceeded() {
        let body = error_body(503, "UNAVAILABLE", None);
        assert_matches!(
            translate_error(503, &body),
            DeliveryError::Unavailable {
                status: Some(503),
                ..
            }
        );

        let body = error_body(429, "RESOURCE_EXHAUSTED", Some("QUOTA_EXCEEDED"));
        assert_matches!(
            translate_error(429, &body),
            DeliveryError::Unavailable {
                status: Some(429),
                ..
            }
        );
    }

    #[test]
    fn internal_fault() {
        let body = error_body(500, "INTERNAL", Some("INTERNAL"));
        assert_matches!(
            translate_error(500, &body),
            DeliveryError::Internal {
                status: Some(500),
                ..
            }
        );
    }

    #[test]
    fn invalid_argument_and_sender_mismatch() {
        let body = error_body(400, "INVALID_ARGUMENT", Some("INVALID_ARGUMENT"));
        assert_matches!(
            translate_error(400, &body),
            DeliveryError::InvalidArgument { .. }
        );

        let body = error_body(403, "PERMISSION_DENIED", Some("SENDER_ID_MISMATCH"));
        assert_matches!(
            translate_error(403, &body),
            DeliveryError::InvalidArgument {
                status: Some(403),
                ..
            }
        );
    }

    #[test]
    fn unrecognized_code_is_other() {
        let body = error_body(403, "PERMISSION_DENIED", None);
        assert_matches!(
            translate_error(403, &body),
            DeliveryError::Other {
                status: Some(403),
                ..
            }
        );
    }

    #[test]
    fn unparsable_body_is_other_with_raw_text() {
        let err = translate_error(502, "<html>bad gateway</html>");
        assert_matches!(err, DeliveryError::Other { status: Some(502), .. });
        assert!(err.message().contains("bad gateway"));
    }

    #[test]
    fn message_prefers_error_message_field() {
        let body = error_body(404, "NOT_FOUND", Some("UNREGISTERED"));
        let err = translate_error(404, &body);
        assert_eq!(err.message(), "NOT_FOUND from backend");
    }

    #[test]
    fn build_message_with_channel() {
        let n = Notification::new("Hi", "There", "tok-1", "holds", "msmith");
        let payload = FcmClient::build_message(&n);

        assert_eq!(payload["message"]["token"], "tok-1");
        assert_eq!(payload["message"]["notification"]["title"], "Hi");
        assert_eq!(payload["message"]["notification"]["body"], "There");
        assert_eq!(payload["message"]["data"]["pushrelay.type"], "holds");
        assert_eq!(payload["message"]["data"]["pushrelay.username"], "msmith");
        assert_eq!(
            payload["message"]["android"]["notification"]["channel_id"],
            "holds"
        );
    }

    #[test]
    fn build_message_without_channel() {
        let n = Notification::new("Hi", "There", "tok-1", "", "");
        let payload = FcmClient::build_message(&n);

        assert!(payload["message"]["android"].is_null());
        // Reserved keys still present, just empty.
        assert_eq!(payload["message"]["data"]["pushrelay.type"], "");
    }
}
