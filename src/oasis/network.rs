//! Network service: private endpoint services

use super::client::{segment, service_client};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aks {
    pub client_subscription_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsPrincipals {
    pub account_id: String,
    pub user_names: Vec<String>,
    pub role_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aws {
    pub principals: Vec<AwsPrincipals>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gcp {
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateEndpointService {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub deployment_id: String,
    pub alternate_dns_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aks: Option<Aks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<Aws>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<Gcp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

service_client!(
    /// Stub for the network service
    NetworkClient,
    "network"
);

impl NetworkClient<'_> {
    pub async fn get_private_endpoint_service(&self, id: &str) -> Result<PrivateEndpointService> {
        let url = self.url(&format!("privateendpointservices/{}", segment(id)));
        self.client.get(&url).await
    }

    pub async fn create_private_endpoint_service(
        &self,
        service: &PrivateEndpointService,
    ) -> Result<PrivateEndpointService> {
        self.client.post(&self.url("privateendpointservices"), service).await
    }

    pub async fn update_private_endpoint_service(
        &self,
        service: &PrivateEndpointService,
    ) -> Result<PrivateEndpointService> {
        let url = self.url(&format!("privateendpointservices/{}", segment(&service.id)));
        self.client.put(&url, service).await
    }
}
