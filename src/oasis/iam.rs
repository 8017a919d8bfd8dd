//! Identity and access management: users, groups, roles and policies

use super::client::{segment, service_client};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub organization_id: String,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub organization_id: String,
    pub permissions: Vec<String>,
    pub is_predefined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleBinding {
    pub role_id: String,
    pub member_id: String,
}

impl RoleBinding {
    pub const GROUP_PREFIX: &'static str = "group:";
    pub const USER_PREFIX: &'static str = "user:";

    pub fn group(role_id: &str, group_id: &str) -> Self {
        Self {
            role_id: role_id.to_string(),
            member_id: format!("{}{}", Self::GROUP_PREFIX, group_id),
        }
    }

    pub fn user(role_id: &str, user_id: &str) -> Self {
        Self {
            role_id: role_id.to_string(),
            member_id: format!("{}{}", Self::USER_PREFIX, user_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub resource_url: String,
    pub bindings: Vec<RoleBinding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleBindingsRequest {
    pub resource_url: String,
    pub bindings: Vec<RoleBinding>,
}

service_client!(
    /// Stub for the IAM service
    IamClient,
    "iam",
    with_query
);

impl IamClient<'_> {
    /// The user owning the API key
    pub async fn get_this_user(&self) -> Result<User> {
        self.client.get(&self.url("user")).await
    }

    pub async fn get_group(&self, id: &str) -> Result<Group> {
        self.client.get(&self.url(&format!("groups/{}", segment(id)))).await
    }

    pub async fn create_group(&self, group: &Group) -> Result<Group> {
        let url = self.url(&format!("organizations/{}/groups", segment(&group.organization_id)));
        self.client.post(&url, group).await
    }

    pub async fn update_group(&self, group: &Group) -> Result<Group> {
        self.client.put(&self.url(&format!("groups/{}", segment(&group.id))), group).await
    }

    pub async fn delete_group(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("groups/{}", segment(id)))).await
    }

    pub async fn get_role(&self, id: &str) -> Result<Role> {
        self.client.get(&self.url(&format!("roles/{}", segment(id)))).await
    }

    pub async fn create_role(&self, role: &Role) -> Result<Role> {
        let url = self.url(&format!("organizations/{}/roles", segment(&role.organization_id)));
        self.client.post(&url, role).await
    }

    pub async fn update_role(&self, role: &Role) -> Result<Role> {
        self.client.put(&self.url(&format!("roles/{}", segment(&role.id))), role).await
    }

    pub async fn delete_role(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("roles/{}", segment(id)))).await
    }

    pub async fn get_policy(&self, resource_url: &str) -> Result<Policy> {
        let url = self.url_with_query("policies", &[("url", resource_url)])?;
        self.client.get(&url).await
    }

    pub async fn add_role_bindings(&self, request: &RoleBindingsRequest) -> Result<Policy> {
        self.client.post(&self.url("policies/bindings/add"), request).await
    }

    pub async fn delete_role_bindings(&self, request: &RoleBindingsRequest) -> Result<Policy> {
        self.client.post(&self.url("policies/bindings/delete"), request).await
    }
}
