//! Messaging-provider gateway client.
//!
//! Sends a single push notification per call, best-effort: every failure is
//! classified for logging and absorbed, because push delivery must never fail
//! the operation that requested it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use quill_common::{AppError, AppResult};
use quill_core::ReactionPush;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;

/// Fixed notification title for reaction pushes.
const NOTIFICATION_TITLE: &str = "User reaction";

/// OAuth scope required to call the message send endpoint.
const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Push delivery outcome classes. Logged, never propagated.
#[derive(Debug, Error)]
enum PushError {
    #[error("provider returned {0}")]
    Status(reqwest::StatusCode),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("credential error: {0}")]
    Credential(String),
}

/// A bearer credential for the messaging provider.
#[derive(Debug, Clone)]
pub struct BearerCredential {
    /// The access token value.
    pub token: String,
    /// When the token stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl BearerCredential {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Source of fresh provider credentials.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetch a fresh credential.
    async fn fetch(&self) -> AppResult<BearerCredential>;
}

/// Caching credential provider.
///
/// Holds one `{token, expiry}` pair behind a single accessor and refreshes it
/// only when missing or expired. Refresh-on-401 is deliberately not done; a
/// revoked-but-unexpired token surfaces as a logged HTTP error on the next
/// send.
pub struct CredentialProvider {
    source: Arc<dyn TokenSource>,
    cached: Mutex<Option<BearerCredential>>,
}

impl CredentialProvider {
    /// Create a provider over the given source.
    #[must_use]
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
        }
    }

    /// The current bearer token, fetching a fresh one if needed.
    pub async fn bearer_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref() {
            if !credential.is_expired() {
                return Ok(credential.token.clone());
            }
        }

        let fresh = self.source.fetch().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);

        Ok(token)
    }
}

/// Service-account key material, as shipped by the provider.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

/// Claim set for the signed service-account assertion.
#[derive(Debug, serde::Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Shape of the provider's token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Production token source: exchanges a signed RS256 service-account
/// assertion at the provider's OAuth token endpoint.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: jsonwebtoken::EncodingKey,
    http_client: reqwest::Client,
}

impl ServiceAccountTokenSource {
    /// Load the service-account key from a JSON file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read service account key: {e}")))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Malformed service account key: {e}")))?;

        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::Config(format!("Invalid service account private key: {e}")))?;

        Ok(Self {
            key,
            encoding_key,
            http_client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn fetch(&self) -> AppResult<BearerCredential> {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: MESSAGING_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let assertion = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign assertion: {e}")))?;

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Malformed token response: {e}")))?;

        Ok(BearerCredential {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

/// Push gateway client.
#[derive(Clone)]
pub struct PushGateway {
    http_client: reqwest::Client,
    send_url: String,
    credentials: Arc<CredentialProvider>,
}

impl PushGateway {
    /// Create a new gateway client.
    ///
    /// # Panics
    /// Panics if the HTTP client fails to build.
    #[must_use]
    #[allow(clippy::expect_used)] // Client build only fails with incompatible TLS settings
    pub fn new(send_url: String, credentials: Arc<CredentialProvider>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            send_url,
            credentials,
        }
    }

    /// Send one push notification to one device.
    ///
    /// Never returns an error: all outcomes are classified and logged here,
    /// and the caller's operation proceeds regardless.
    pub async fn send(&self, push: &ReactionPush, device_token: &str) {
        match self.try_send(push, device_token).await {
            Ok(status) => {
                tracing::info!(
                    notification_id = %push.notification_id,
                    status = %status,
                    "Push dispatched"
                );
            }
            Err(PushError::Status(status)) => {
                tracing::warn!(
                    notification_id = %push.notification_id,
                    status = %status,
                    "Push rejected by provider"
                );
            }
            Err(PushError::Timeout) => {
                tracing::warn!(
                    notification_id = %push.notification_id,
                    "Push request timed out"
                );
            }
            Err(PushError::Network(e)) => {
                tracing::warn!(
                    notification_id = %push.notification_id,
                    error = %e,
                    "Push request failed"
                );
            }
            Err(PushError::Credential(e)) => {
                tracing::warn!(
                    notification_id = %push.notification_id,
                    error = %e,
                    "Could not obtain push credential"
                );
            }
        }
    }

    async fn try_send(
        &self,
        push: &ReactionPush,
        device_token: &str,
    ) -> Result<reqwest::StatusCode, PushError> {
        let token = self
            .credentials
            .bearer_token()
            .await
            .map_err(|e| PushError::Credential(e.to_string()))?;

        let response = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(token)
            .json(&build_payload(push, device_token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PushError::Timeout
                } else {
                    PushError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(PushError::Status(status))
        }
    }
}

/// The provider's message payload.
fn build_payload(push: &ReactionPush, device_token: &str) -> serde_json::Value {
    json!({
        "to": device_token,
        "notification": {
            "title": NOTIFICATION_TITLE,
            "body": format!(
                "{} reacted with {} to your post \"{}\"",
                push.reactor_name, push.emoji, push.post_title
            ),
            "sound": "default",
        },
        "priority": "high",
    })
}
