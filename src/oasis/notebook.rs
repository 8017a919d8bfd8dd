//! Notebook service: notebooks and notebook models

use super::client::{segment, service_client, ItemList};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookModelSpec {
    pub notebook_model_id: String,
    pub disk_size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookUsage {
    pub last_memory_usage: i64,
    pub last_cpu_usage: f64,
    pub last_memory_limit: i64,
    pub last_cpu_limit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookStatus {
    pub phase: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<NotebookUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notebook {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub deployment_id: String,
    pub created_by_id: String,
    pub is_paused: bool,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<NotebookModelSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NotebookStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_paused_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_resumed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookModel {
    pub id: String,
    pub name: String,
    pub min_disk_size: i32,
    pub max_disk_size: i32,
    pub cpu: f64,
    pub memory: i32,
}

service_client!(
    /// Stub for the notebook service
    NotebookClient,
    "notebook"
);

impl NotebookClient<'_> {
    pub async fn get_notebook(&self, id: &str) -> Result<Notebook> {
        self.client.get(&self.url(&format!("notebooks/{}", segment(id)))).await
    }

    pub async fn create_notebook(&self, notebook: &Notebook) -> Result<Notebook> {
        self.client.post(&self.url("notebooks"), notebook).await
    }

    pub async fn update_notebook(&self, notebook: &Notebook) -> Result<Notebook> {
        self.client.put(&self.url(&format!("notebooks/{}", segment(&notebook.id))), notebook).await
    }

    pub async fn delete_notebook(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("notebooks/{}", segment(id)))).await
    }

    pub async fn list_notebook_models(&self, deployment_id: &str) -> Result<Vec<NotebookModel>> {
        let url = self.url(&format!("deployments/{}/notebookmodels", segment(deployment_id)));
        let list: ItemList<NotebookModel> = self.client.get(&url).await?;
        Ok(list.items)
    }
}
