//! Oasis Authentication
//!
//! Exchanges an API key pair for a bearer token.

use super::http::OasisHttpClient;
use crate::error::{ProviderError, Result};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;

/// Environment variable holding the API key id
pub const ENV_API_KEY_ID: &str = "OASIS_API_KEY_ID";
/// Environment variable holding the API key secret
pub const ENV_API_KEY_SECRET: &str = "OASIS_API_KEY_SECRET";

/// API key pair
#[derive(Clone)]
pub struct ApiKeyCredentials {
    key_id: String,
    key_secret: String,
}

/// Security: the secret never reaches logs
impl fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"***")
            .finish()
    }
}

/// Bearer token returned by the authenticate call
///
/// A session lives for one invocation, so the token is never refreshed.
#[derive(Clone)]
pub struct AuthToken {
    pub token: String,
}

#[derive(Deserialize)]
struct AuthenticateResponse {
    token: String,
    #[serde(default, with = "super::duration::option")]
    time_to_live: Option<Duration>,
}

impl ApiKeyCredentials {
    /// Both halves must be non-empty
    pub fn new(key_id: &str, key_secret: &str) -> Result<Self> {
        if key_id.is_empty() || key_secret.is_empty() {
            return Err(ProviderError::Config(
                "api_key_id and api_key_secret must both be set".to_string(),
            ));
        }
        Ok(Self {
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Authenticate against `base_url` and return a fresh token
    pub async fn authenticate(&self, http: &OasisHttpClient, base_url: &str) -> Result<AuthToken> {
        let url = format!(
            "{}/api/iam/v1/apikeys/{}/authenticate",
            base_url,
            urlencoding::encode(&self.key_id)
        );
        let body = json!({ "id": self.key_id, "secret": self.key_secret });

        let response = http.post(&url, None, &body).await.map_err(|e| match e {
            ProviderError::Cancelled => e,
            other => ProviderError::Config(format!("authentication failed: {other}")),
        })?;
        let response: AuthenticateResponse = serde_json::from_value(response)
            .map_err(|e| ProviderError::Config(format!("authentication failed: {e}")))?;

        tracing::debug!(
            "Authenticated API key {}, token valid for {:?}",
            self.key_id,
            response.time_to_live
        );

        Ok(AuthToken {
            token: response.token,
        })
    }
}

/// Read fallback credentials from the environment
pub fn env_credentials() -> (Option<String>, Option<String>) {
    let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    (read(ENV_API_KEY_ID), read(ENV_API_KEY_SECRET))
}
