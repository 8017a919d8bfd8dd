//! Oasis Client
//!
//! Main client for interacting with Oasis APIs, combining authentication,
//! HTTP functionality and cancellation.

use super::auth::ApiKeyCredentials;
use super::cancel::CancelSignal;
use super::http::OasisHttpClient;
use super::{
    audit::AuditClient, backup::BackupClient, crypto::CryptoClient, data::DataClient,
    example::ExampleClient, iam::IamClient, network::NetworkClient, notebook::NotebookClient,
    platform::PlatformClient, resourcemanager::ResourceManagerClient, security::SecurityClient,
};
use crate::error::{ProviderError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default API host
pub const DEFAULT_ENDPOINT_ADDRESS: &str = "api.cloud.arangodb.com";
/// Default port fragment appended to the host
pub const DEFAULT_PORT_SUFFIX: &str = ":443";

/// Wrapper of list responses (`{"items": [...]}`)
#[derive(Debug, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Main Oasis client
#[derive(Clone)]
pub struct OasisClient {
    pub http: OasisHttpClient,
    base_url: String,
    token: String,
    cancel: CancelSignal,
}

/// Build the base URL from address and port fragment
///
/// An address that already carries a scheme is used verbatim.
pub fn endpoint_url(address: &str, port_suffix: &str) -> String {
    let address = address.trim_end_matches('/');
    if address.contains("://") {
        address.to_string()
    } else {
        format!("https://{address}{port_suffix}")
    }
}

impl OasisClient {
    /// Authenticate with `credentials` and return a connected client
    pub async fn connect(
        base_url: &str,
        credentials: &ApiKeyCredentials,
        cancel: CancelSignal,
    ) -> Result<Self> {
        let http = OasisHttpClient::new()?;
        let token = cancel
            .guard(credentials.authenticate(&http, base_url))
            .await?;
        Ok(Self::with_token(http, base_url, &token.token, cancel))
    }

    /// Client over an already issued token
    pub fn with_token(http: OasisHttpClient, base_url: &str, token: &str, cancel: CancelSignal) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            cancel,
        }
    }

    /// Build an API URL: `<base>/api/<service>/v1/<path>`
    pub fn api_url(&self, service: &str, path: &str) -> String {
        format!("{}/api/{}/v1/{}", self.base_url, service, path)
    }

    /// Make a GET request and decode the response
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self.cancel.guard(self.http.get(url, &self.token)).await?;
        decode(value)
    }

    /// Make a POST request and decode the response
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let body = encode(body)?;
        let value = self
            .cancel
            .guard(self.http.post(url, Some(&self.token), &body))
            .await?;
        decode(value)
    }

    /// Make a PUT request and decode the response
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let body = encode(body)?;
        let value = self.cancel.guard(self.http.put(url, &self.token, &body)).await?;
        decode(value)
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<()> {
        self.cancel.guard(self.http.delete(url, &self.token)).await?;
        Ok(())
    }

    // =========================================================================
    // Service stubs
    // =========================================================================

    pub fn iam(&self) -> IamClient<'_> {
        IamClient::new(self)
    }

    pub fn resource_manager(&self) -> ResourceManagerClient<'_> {
        ResourceManagerClient::new(self)
    }

    pub fn data(&self) -> DataClient<'_> {
        DataClient::new(self)
    }

    pub fn backup(&self) -> BackupClient<'_> {
        BackupClient::new(self)
    }

    pub fn crypto(&self) -> CryptoClient<'_> {
        CryptoClient::new(self)
    }

    pub fn security(&self) -> SecurityClient<'_> {
        SecurityClient::new(self)
    }

    pub fn audit(&self) -> AuditClient<'_> {
        AuditClient::new(self)
    }

    pub fn network(&self) -> NetworkClient<'_> {
        NetworkClient::new(self)
    }

    pub fn notebook(&self) -> NotebookClient<'_> {
        NotebookClient::new(self)
    }

    pub fn example(&self) -> ExampleClient<'_> {
        ExampleClient::new(self)
    }

    pub fn platform(&self) -> PlatformClient<'_> {
        PlatformClient::new(self)
    }
}

/// Escape one path segment
pub fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| ProviderError::invalid(format!("failed to encode request: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    // Empty bodies decode as an empty object so `#[serde(default)]` records still parse
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|e| ProviderError::Remote {
        status: 200,
        message: format!("failed to decode response: {e}"),
    })
}

/// Append encoded query parameters to `url`, skipping empty values
pub(crate) fn with_query(url: &str, query: &[(&str, &str)]) -> Result<String> {
    let mut url = url::Url::parse(url)
        .map_err(|e| ProviderError::Config(format!("invalid API endpoint: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query.iter().filter(|(_, v)| !v.is_empty()) {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.to_string().trim_end_matches('?').to_string())
}

/// Generates a borrowed service stub type; `with_query` adds `url_with_query`
macro_rules! service_client {
    ($(#[$meta:meta])* $name:ident, $service:literal, with_query) => {
        $crate::oasis::client::service_client!($(#[$meta])* $name, $service);

        impl $name<'_> {
            fn url_with_query(&self, path: &str, query: &[(&str, &str)]) -> $crate::error::Result<String> {
                $crate::oasis::client::with_query(&self.url(path), query)
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, $service:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        pub struct $name<'a> {
            client: &'a $crate::oasis::client::OasisClient,
        }

        impl<'a> $name<'a> {
            pub(crate) fn new(client: &'a $crate::oasis::client::OasisClient) -> Self {
                Self { client }
            }

            fn url(&self, path: &str) -> String {
                self.client.api_url($service, path)
            }
        }
    };
}
pub(crate) use service_client;
