//! Provider Configuration
//!
//! Top-level options the host passes at initialization, with environment
//! fallbacks.

use crate::error::{ProviderError, Result};
use crate::oasis::auth::{self, ApiKeyCredentials};
use crate::oasis::client::{endpoint_url, DEFAULT_ENDPOINT_ADDRESS, DEFAULT_PORT_SUFFIX};
use crate::schema::{Attribute, AttributeMap, Schema};
use serde::Deserialize;
use std::fmt;

/// Environment fallback for the default organization
pub const ENV_ORGANIZATION: &str = "OASIS_ORGANIZATION";
/// Environment fallback for the default project
pub const ENV_PROJECT: &str = "OASIS_PROJECT";

/// Provider configuration
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key_id: Option<String>,
    pub api_key_secret: Option<String>,
    pub api_endpoint_address: Option<String>,
    pub api_endpoint_port_suffix: Option<String>,
    /// Default organization inherited by resources leaving theirs unset
    pub organization: Option<String>,
    /// Default project inherited by resources leaving theirs unset
    pub project: Option<String>,
}

/// Security: the secret never reaches logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &self.api_key_secret.as_ref().map(|_| "***"))
            .field("api_endpoint_address", &self.api_endpoint_address)
            .field("api_endpoint_port_suffix", &self.api_endpoint_port_suffix)
            .field("organization", &self.organization)
            .field("project", &self.project)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl ProviderConfig {
    /// Decode the host's configuration block
    pub fn from_attributes(values: &AttributeMap) -> Result<Self> {
        let json = serde_json::to_value(values)
            .map_err(|e| ProviderError::Config(format!("invalid provider configuration: {e}")))?;
        serde_json::from_value(json)
            .map_err(|e| ProviderError::Config(format!("invalid provider configuration: {e}")))
    }

    /// Schema of the provider configuration block
    pub fn schema() -> Schema {
        Schema::nested()
            .attr(
                "api_key_id",
                Attribute::string()
                    .optional()
                    .describe("API key id (falls back to OASIS_API_KEY_ID)"),
            )
            .attr(
                "api_key_secret",
                Attribute::string()
                    .optional()
                    .sensitive()
                    .describe("API key secret (falls back to OASIS_API_KEY_SECRET)"),
            )
            .attr(
                "api_endpoint_address",
                Attribute::string()
                    .optional()
                    .describe("API host, defaults to api.cloud.arangodb.com"),
            )
            .attr(
                "api_endpoint_port_suffix",
                Attribute::string()
                    .optional()
                    .describe("Port fragment appended to the host, defaults to :443"),
            )
            .attr(
                "organization",
                Attribute::string().optional().describe("Default organization id"),
            )
            .attr(
                "project",
                Attribute::string().optional().describe("Default project id"),
            )
    }

    /// Credentials (config > environment); both halves are required
    pub fn credentials(&self) -> Result<ApiKeyCredentials> {
        let (env_id, env_secret) = auth::env_credentials();
        let key_id = non_empty(&self.api_key_id).or(env_id);
        let key_secret = non_empty(&self.api_key_secret).or(env_secret);
        match (key_id, key_secret) {
            (Some(id), Some(secret)) => ApiKeyCredentials::new(&id, &secret),
            (None, _) => Err(ProviderError::Config(format!(
                "api_key_id is required (or set {})",
                auth::ENV_API_KEY_ID
            ))),
            (_, None) => Err(ProviderError::Config(format!(
                "api_key_secret is required (or set {})",
                auth::ENV_API_KEY_SECRET
            ))),
        }
    }

    /// Base URL of the API
    pub fn endpoint(&self) -> String {
        let address = non_empty(&self.api_endpoint_address)
            .unwrap_or_else(|| DEFAULT_ENDPOINT_ADDRESS.to_string());
        let suffix = self
            .api_endpoint_port_suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_PORT_SUFFIX.to_string());
        endpoint_url(&address, &suffix)
    }

    /// Get effective organization (config > environment)
    pub fn effective_organization(&self) -> String {
        non_empty(&self.organization)
            .or_else(|| env_value(ENV_ORGANIZATION))
            .unwrap_or_default()
    }

    /// Get effective project (config > environment)
    pub fn effective_project(&self) -> String {
        non_empty(&self.project)
            .or_else(|| env_value(ENV_PROJECT))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::schema::AttributeValue;

    #[test]
    fn test_from_attributes() {
        let config = ProviderConfig::from_attributes(&attrs! {
            "api_key_id" => "id",
            "api_key_secret" => "secret",
            "organization" => "org-1",
            "project" => AttributeValue::Null,
        })
        .unwrap();
        assert_eq!(config.api_key_id.as_deref(), Some("id"));
        assert_eq!(config.effective_organization(), "org-1");
        assert!(config.project.is_none());
        assert!(config.credentials().is_ok());
    }

    #[test]
    fn test_default_endpoint() {
        let config = ProviderConfig::default();
        assert_eq!(config.endpoint(), "https://api.cloud.arangodb.com:443");
    }

    #[test]
    fn test_custom_endpoint() {
        let config = ProviderConfig {
            api_endpoint_address: Some("api.example.test".into()),
            api_endpoint_port_suffix: Some(":8443".into()),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "https://api.example.test:8443");
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ProviderConfig {
            api_key_secret: Some("hunter2".into()),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_schema_is_well_formed() {
        assert!(ProviderConfig::schema().check().is_ok());
    }
}
