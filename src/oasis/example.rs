//! Example service: example datasets and their installations

use super::client::{segment, service_client, ItemList};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExampleDataset {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub guide: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationStatus {
    pub database_name: String,
    pub state: String,
    pub is_available: bool,
    pub is_failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExampleDatasetInstallation {
    pub id: String,
    pub url: String,
    pub deployment_id: String,
    pub exampledataset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InstallationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

service_client!(
    /// Stub for the example service
    ExampleClient,
    "example",
    with_query
);

impl ExampleClient<'_> {
    pub async fn list_example_datasets(&self, organization_id: &str) -> Result<Vec<ExampleDataset>> {
        let url = self.url_with_query("exampledatasets", &[("organization_id", organization_id)])?;
        let list: ItemList<ExampleDataset> = self.client.get(&url).await?;
        Ok(list.items)
    }

    pub async fn get_installation(&self, id: &str) -> Result<ExampleDatasetInstallation> {
        self.client.get(&self.url(&format!("installations/{}", segment(id)))).await
    }

    pub async fn create_installation(
        &self,
        installation: &ExampleDatasetInstallation,
    ) -> Result<ExampleDatasetInstallation> {
        self.client.post(&self.url("installations"), installation).await
    }

    pub async fn delete_installation(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("installations/{}", segment(id)))).await
    }
}
