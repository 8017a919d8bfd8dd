//! Platform service: cloud providers and regions

use super::client::{segment, service_client, ItemList};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudProvider {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub id: String,
    pub provider_id: String,
    pub location: String,
    pub available: bool,
}

service_client!(
    /// Stub for the platform service
    PlatformClient,
    "platform",
    with_query
);

impl PlatformClient<'_> {
    pub async fn list_providers(&self, organization_id: &str) -> Result<Vec<CloudProvider>> {
        let url = self.url_with_query("providers", &[("organization_id", organization_id)])?;
        let list: ItemList<CloudProvider> = self.client.get(&url).await?;
        Ok(list.items)
    }

    pub async fn list_regions(&self, provider_id: &str, organization_id: &str) -> Result<Vec<Region>> {
        let path = format!("providers/{}/regions", segment(provider_id));
        let url = self.url_with_query(&path, &[("organization_id", organization_id)])?;
        let list: ItemList<Region> = self.client.get(&url).await?;
        Ok(list.items)
    }
}
