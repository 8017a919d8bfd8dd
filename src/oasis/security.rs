//! Security service: IP allowlists

use super::client::{segment, service_client};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpAllowlist {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub project_id: String,
    pub cidr_ranges: Vec<String>,
    pub remote_inspection_allowed: bool,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

service_client!(
    /// Stub for the security service
    SecurityClient,
    "security"
);

impl SecurityClient<'_> {
    pub async fn get_ip_allowlist(&self, id: &str) -> Result<IpAllowlist> {
        self.client.get(&self.url(&format!("ipallowlists/{}", segment(id)))).await
    }

    pub async fn create_ip_allowlist(&self, list: &IpAllowlist) -> Result<IpAllowlist> {
        self.client.post(&self.url("ipallowlists"), list).await
    }

    pub async fn update_ip_allowlist(&self, list: &IpAllowlist) -> Result<IpAllowlist> {
        self.client.put(&self.url(&format!("ipallowlists/{}", segment(&list.id))), list).await
    }

    pub async fn delete_ip_allowlist(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("ipallowlists/{}", segment(id)))).await
    }
}
