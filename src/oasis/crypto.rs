//! Crypto service: CA certificates

use super::client::{segment, service_client, ItemList};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaCertificate {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub project_id: String,
    #[serde(
        with = "super::duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub lifetime: Option<Duration>,
    pub use_well_known_certificate: bool,
    pub locked: bool,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

service_client!(
    /// Stub for the crypto service
    CryptoClient,
    "crypto"
);

impl CryptoClient<'_> {
    pub async fn list_ca_certificates(&self, project_id: &str) -> Result<Vec<CaCertificate>> {
        let url = self.url(&format!("projects/{}/cacertificates", segment(project_id)));
        let list: ItemList<CaCertificate> = self.client.get(&url).await?;
        Ok(list.items)
    }

    pub async fn get_ca_certificate(&self, id: &str) -> Result<CaCertificate> {
        self.client.get(&self.url(&format!("cacertificates/{}", segment(id)))).await
    }

    pub async fn create_ca_certificate(&self, cert: &CaCertificate) -> Result<CaCertificate> {
        self.client.post(&self.url("cacertificates"), cert).await
    }

    pub async fn update_ca_certificate(&self, cert: &CaCertificate) -> Result<CaCertificate> {
        self.client.put(&self.url(&format!("cacertificates/{}", segment(&cert.id))), cert).await
    }

    pub async fn delete_ca_certificate(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("cacertificates/{}", segment(id)))).await
    }
}
