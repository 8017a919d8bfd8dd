//! Data service: deployments, versions and node sizes

use super::client::{segment, service_client, ItemList};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateSpec {
    pub ca_certificate_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    pub model: String,
    pub node_size_id: String,
    pub node_count: i32,
    pub node_disk_size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskAutoSizeSettings {
    pub maximum_node_disk_size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentStatus {
    pub endpoint: String,
    pub created: bool,
    pub ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub project_id: String,
    pub region_id: String,
    pub version: String,
    pub ipallowlist_id: String,
    pub disable_foxx_authentication: bool,
    pub disk_performance_id: String,
    pub accepted_terms_and_conditions_id: String,
    pub locked: bool,
    pub deployment_profile_id: String,
    pub is_scheduled_root_password_rotation_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates: Option<CertificateSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_auto_size_settings: Option<DiskAutoSizeSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_settings: Option<NotificationSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSize {
    pub id: String,
    pub name: String,
    pub memory_size: i32,
    pub min_disk_size: i32,
    pub max_disk_size: i32,
}

service_client!(
    /// Stub for the data service
    DataClient,
    "data",
    with_query
);

impl DataClient<'_> {
    pub async fn get_deployment(&self, id: &str) -> Result<Deployment> {
        self.client.get(&self.url(&format!("deployments/{}", segment(id)))).await
    }

    pub async fn create_deployment(&self, deployment: &Deployment) -> Result<Deployment> {
        let url = self.url(&format!("projects/{}/deployments", segment(&deployment.project_id)));
        self.client.post(&url, deployment).await
    }

    pub async fn update_deployment(&self, deployment: &Deployment) -> Result<Deployment> {
        let url = self.url(&format!("deployments/{}", segment(&deployment.id)));
        self.client.put(&url, deployment).await
    }

    pub async fn delete_deployment(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("deployments/{}", segment(id)))).await
    }

    /// Database version used when a deployment does not pin one
    pub async fn get_default_version(&self) -> Result<Version> {
        self.client.get(&self.url("versions/default")).await
    }

    pub async fn list_node_sizes(&self, project_id: &str, region_id: &str, model: &str) -> Result<Vec<NodeSize>> {
        let path = format!(
            "projects/{}/regions/{}/nodesizes",
            segment(project_id),
            segment(region_id)
        );
        let url = self.url_with_query(&path, &[("model", model)])?;
        let list: ItemList<NodeSize> = self.client.get(&url).await?;
        Ok(list.items)
    }
}
