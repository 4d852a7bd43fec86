//! OAuth access-token minting and caching.
//!
//! FCM's HTTP v1 API authenticates with an OAuth 2.0 bearer token.
//! The service account signs an RS256 JWT and exchanges it at the
//! token endpoint using the JWT-bearer grant. Tokens are cached and
//! refreshed ahead of expiry.

use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{FcmError, ServiceAccount};
use pushrelay_core::DeliveryError;

/// OAuth scope granting FCM send access.
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// JWT-bearer grant type identifier.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion (Google's maximum).
const ASSERTION_VALIDITY_SECS: i64 = 3600;

/// Refresh the cached access token this long before it expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// JWT claims for the service account assertion.
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    /// Issuer (service account email).
    iss: String,
    /// Requested scope.
    scope: String,
    /// Audience (the token endpoint).
    aud: String,
    /// Issued at (Unix timestamp).
    iat: i64,
    /// Expiry (Unix timestamp).
    exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Cached access token with expiry tracking.
struct CachedToken {
    token: String,
    fetched_at: Instant,
    validity: Duration,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() + REFRESH_MARGIN < self.validity
    }
}

/// Mints and caches OAuth access tokens for a service account.
pub struct TokenProvider {
    client_email: String,
    key_id: Option<String>,
    token_url: String,
    encoding_key: EncodingKey,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("client_email", &self.client_email)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Create a provider from service account credentials.
    ///
    /// Parses the RSA private key up front so a bad key fails at
    /// startup, not on the first request.
    pub fn new(account: &ServiceAccount, client: reqwest::Client) -> Result<Self, FcmError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
                FcmError::KeyParse {
                    reason: e.to_string(),
                }
            })?;

        Ok(Self {
            client_email: account.client_email.clone(),
            key_id: account.private_key_id.clone(),
            token_url: account.token_uri.clone(),
            encoding_key,
            client,
            cached: Mutex::new(None),
        })
    }

    /// Get a cached access token or fetch a new one.
    ///
    /// Token failures surface as [`DeliveryError::Other`] with no
    /// backend status: the delivery backend was never reached.
    pub async fn access_token(&self) -> Result<String, DeliveryError> {
        let mut cached = self.cached.lock().await;

        if let Some(ref token) = *cached {
            if token.is_fresh() {
                return Ok(token.token.clone());
            }
        }

        let (token, validity) = self.fetch_token().await?;
        *cached = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
            validity,
        });

        Ok(token)
    }

    /// Exchange a signed assertion for an access token.
    async fn fetch_token(&self) -> Result<(String, Duration), DeliveryError> {
        let assertion = self.sign_assertion()?;

        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| DeliveryError::Other {
                status: None,
                message: format!("token request failed: {e}"),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Other {
                status: None,
                message: format!("token endpoint returned {status}: {body}"),
            });
        }

        let token: TokenResponse =
            response.json().await.map_err(|e| DeliveryError::Other {
                status: None,
                message: format!("malformed token response: {e}"),
            })?;

        debug!(expires_in = token.expires_in, "access token refreshed");
        Ok((
            token.access_token,
            Duration::from_secs(token.expires_in),
        ))
    }

    /// Sign the RS256 JWT assertion.
    fn sign_assertion(&self) -> Result<String, DeliveryError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: FCM_SCOPE.to_string(),
            aud: self.token_url.clone(),
            iat,
            exp: iat + ASSERTION_VALIDITY_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            DeliveryError::Other {
                status: None,
                message: format!("failed to sign token assertion: {e}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertion_claims_serialize() {
        let claims = AssertionClaims {
            iss: "relay@p.iam.gserviceaccount.com".to_string(),
            scope: FCM_SCOPE.to_string(),
            aud: "https://oauth2.googleapis.com/token".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iss"], "relay@p.iam.gserviceaccount.com");
        assert_eq!(json["scope"], FCM_SCOPE);
        assert_eq!(json["exp"], 1_700_003_600);
    }

    #[test]
    fn cached_token_freshness() {
        let fresh = CachedToken {
            token: "t".into(),
            fetched_at: Instant::now(),
            validity: Duration::from_secs(3600),
        };
        assert!(fresh.is_fresh());

        // A token whose validity is inside the refresh margin is stale.
        let stale = CachedToken {
            token: "t".into(),
            fetched_at: Instant::now(),
            validity: Duration::from_secs(60),
        };
        assert!(!stale.is_fresh());
    }

    #[test]
    fn bad_key_fails_at_construction() {
        let account = ServiceAccount {
            project_id: "p".into(),
            client_email: "a@b".into(),
            private_key: "not a pem".into(),
            private_key_id: None,
            token_uri: "https://oauth2.googleapis.com/token".into(),
        };
        let err = TokenProvider::new(&account, reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, FcmError::KeyParse { .. }));
    }
}
