//! HTTP utilities for Oasis REST API calls

use crate::error::{ProviderError, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("terraform-provider-oasis/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Oasis API calls
#[derive(Clone)]
pub struct OasisHttpClient {
    client: Client,
}

impl OasisHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Make a GET request to an Oasis API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        self.execute(Method::GET, url, Some(token), None).await
    }

    /// Make a POST request to an Oasis API
    pub async fn post(&self, url: &str, token: Option<&str>, body: &Value) -> Result<Value> {
        self.execute(Method::POST, url, token, Some(body)).await
    }

    /// Make a PUT request to an Oasis API
    pub async fn put(&self, url: &str, token: &str, body: &Value) -> Result<Value> {
        self.execute(Method::PUT, url, Some(token), Some(body)).await
    }

    /// Make a DELETE request to an Oasis API
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value> {
        self.execute(Method::DELETE, url, Some(token), None).await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(remote_error(status, &response_body));
        }

        // Handle empty response
        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).map_err(|e| ProviderError::Remote {
            status: status.as_u16(),
            message: format!("failed to parse response JSON: {e}"),
        })
    }
}

/// gRPC status code reported by the gateway for missing objects
const GRPC_NOT_FOUND: i64 = 5;

/// Map a failed response onto a provider error, keeping the server's message
pub fn remote_error(status: StatusCode, body: &str) -> ProviderError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error").and_then(|e| e.get("message")))
        })
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });
    let grpc_code = parsed
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(Value::as_i64);

    if status == StatusCode::NOT_FOUND || grpc_code == Some(GRPC_NOT_FOUND) {
        return ProviderError::NotFound(message);
    }

    ProviderError::Remote {
        status: status.as_u16(),
        message,
    }
}
