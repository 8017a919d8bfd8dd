//! IAM role resource

use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::{expand_non_empty_string_list, timestamp_value};
use crate::oasis::iam::Role;
use crate::resource::session::pick;
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::{Attribute, AttributeMap, AttributeType, ResourceData, Schema};
use async_trait::async_trait;

pub struct IamRoleResource;

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("organization", Attribute::string().optional().computed().force_new())
        .attr(
            "permissions",
            Attribute::list_of(AttributeType::String)
                .optional()
                .describe("Permissions granted, e.g. data.deployment.get"),
        )
        .attr("is_predefined", Attribute::bool().computed())
        .attr("url", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
}

pub fn expand_role(data: &ResourceData, default_organization: &str) -> Result<Role> {
    let organization_id = pick(data.get_str("organization"), default_organization);
    if organization_id.is_empty() {
        return Err(ProviderError::missing("organization"));
    }
    Ok(Role {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        organization_id,
        permissions: expand_non_empty_string_list(data.get_list("permissions")),
        ..Default::default()
    })
}

pub fn flatten_role(role: &Role) -> AttributeMap {
    attrs! {
        "name" => &role.name,
        "description" => &role.description,
        "organization" => &role.organization_id,
        "permissions" => role.permissions.clone(),
        "is_predefined" => role.is_predefined,
        "url" => &role.url,
        "created_at" => timestamp_value(role.created_at.as_ref()),
    }
}

#[async_trait]
impl Resource for IamRoleResource {
    fn kind(&self) -> &'static str {
        "oasis_iam_role"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let role = expand_role(data, session.default_organization())?;
        let created = session.iam().create_role(&role).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let role = session.iam().get_role(data.id()).await?;
        data.set_all(flatten_role(&role));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let iam = session.iam();
        let id = data.id().to_string();
        let mut role = fetch_for_update(data, iam.get_role(&id)).await?;
        if data.has_change("name") {
            role.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            role.description = data.get_string("description");
        }
        if data.has_change("permissions") {
            role.permissions = expand_non_empty_string_list(data.get_list("permissions"));
        }
        iam.update_role(&role).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.iam().delete_role(data.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = ResourceData::new(attrs! {
            "name" => "test-role",
            "description" => "test-description",
            "organization" => "org-1",
            "permissions" => vec!["data.deployment.get".to_string(), "data.deployment.list".to_string()],
        });
        let role = expand_role(&data, "").unwrap();
        assert_eq!(role.permissions.len(), 2);
        let flattened = flatten_role(&role);
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_missing_name() {
        let data = ResourceData::new(attrs! { "organization" => "org-1" });
        assert!(expand_role(&data, "").unwrap_err().to_string().contains("name"));
    }
}
