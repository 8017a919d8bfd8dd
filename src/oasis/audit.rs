//! Audit service: audit logs and the organization default

use super::client::{segment, service_client};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Destination type storing events in the Oasis cloud
pub const DESTINATION_CLOUD: &str = "cloud";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Destination {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLog {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub organization_id: String,
    pub is_default: bool,
    pub destinations: Vec<Destination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetDefaultAuditLogRequest {
    pub organization_id: String,
    /// Empty clears the default
    pub auditlog_id: String,
}

service_client!(
    /// Stub for the audit service
    AuditClient,
    "audit"
);

impl AuditClient<'_> {
    pub async fn get_audit_log(&self, id: &str) -> Result<AuditLog> {
        self.client.get(&self.url(&format!("auditlogs/{}", segment(id)))).await
    }

    pub async fn create_audit_log(&self, log: &AuditLog) -> Result<AuditLog> {
        self.client.post(&self.url("auditlogs"), log).await
    }

    pub async fn update_audit_log(&self, log: &AuditLog) -> Result<AuditLog> {
        self.client.put(&self.url(&format!("auditlogs/{}", segment(&log.id))), log).await
    }

    pub async fn delete_audit_log(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("auditlogs/{}", segment(id)))).await
    }

    pub async fn set_default_audit_log(&self, organization_id: &str, auditlog_id: &str) -> Result<()> {
        let url = self.url(&format!("organizations/{}/defaultauditlog", segment(organization_id)));
        let request = SetDefaultAuditLogRequest {
            organization_id: organization_id.to_string(),
            auditlog_id: auditlog_id.to_string(),
        };
        let _: serde_json::Value = self.client.post(&url, &request).await?;
        Ok(())
    }
}
