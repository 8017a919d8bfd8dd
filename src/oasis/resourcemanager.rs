//! Resource manager: organizations, projects, invites, terms and conditions

use super::client::{segment, service_client, ItemList};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tier {
    pub id: String,
    pub name: String,
    pub has_support_plans: bool,
    pub has_backup_uploads: bool,
    pub requires_terms_and_conditions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationProviders {
    pub enable_github: bool,
    pub enable_google: bool,
    pub enable_microsoft: bool,
    pub enable_username_password: bool,
    pub enable_sso: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub is_deleted: bool,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_providers: Option<AuthenticationProviders>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub organization_id: String,
    pub is_deleted: bool,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationInvite {
    pub id: String,
    pub url: String,
    pub organization_id: String,
    pub email: String,
    pub accepted: bool,
    pub rejected: bool,
    pub created_by_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsAndConditions {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

service_client!(
    /// Stub for the resource manager service
    ResourceManagerClient,
    "resourcemanager",
    with_query
);

impl ResourceManagerClient<'_> {
    /// Organizations the caller is a member of
    pub async fn list_my_organizations(&self) -> Result<Vec<Organization>> {
        let list: ItemList<Organization> = self.client.get(&self.url("self/organizations")).await?;
        Ok(list.items)
    }

    pub async fn get_organization(&self, id: &str) -> Result<Organization> {
        self.client.get(&self.url(&format!("organizations/{}", segment(id)))).await
    }

    pub async fn create_organization(&self, org: &Organization) -> Result<Organization> {
        self.client.post(&self.url("organizations"), org).await
    }

    pub async fn update_organization(&self, org: &Organization) -> Result<Organization> {
        self.client.put(&self.url(&format!("organizations/{}", segment(&org.id))), org).await
    }

    pub async fn delete_organization(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("organizations/{}", segment(id)))).await
    }

    pub async fn get_project(&self, id: &str) -> Result<Project> {
        self.client.get(&self.url(&format!("projects/{}", segment(id)))).await
    }

    pub async fn create_project(&self, project: &Project) -> Result<Project> {
        let url = self.url(&format!("organizations/{}/projects", segment(&project.organization_id)));
        self.client.post(&url, project).await
    }

    pub async fn update_project(&self, project: &Project) -> Result<Project> {
        self.client.put(&self.url(&format!("projects/{}", segment(&project.id))), project).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("projects/{}", segment(id)))).await
    }

    pub async fn get_organization_invite(&self, id: &str) -> Result<OrganizationInvite> {
        self.client.get(&self.url(&format!("invites/{}", segment(id)))).await
    }

    pub async fn create_organization_invite(&self, invite: &OrganizationInvite) -> Result<OrganizationInvite> {
        let url = self.url(&format!("organizations/{}/invites", segment(&invite.organization_id)));
        self.client.post(&url, invite).await
    }

    pub async fn delete_organization_invite(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("invites/{}", segment(id)))).await
    }

    /// Terms that currently apply to `organization_id`
    pub async fn get_current_terms_and_conditions(&self, organization_id: &str) -> Result<TermsAndConditions> {
        let url = self.url_with_query("termsandconditions/current", &[("organization_id", organization_id)])?;
        self.client.get(&url).await
    }

    pub async fn get_terms_and_conditions(&self, id: &str) -> Result<TermsAndConditions> {
        self.client.get(&self.url(&format!("termsandconditions/{}", segment(id)))).await
    }
}
