//! IAM group resource

use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::timestamp_value;
use crate::oasis::iam::Group;
use crate::resource::session::pick;
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::{Attribute, AttributeMap, ResourceData, Schema};
use async_trait::async_trait;

pub struct IamGroupResource;

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("organization", Attribute::string().optional().computed().force_new())
        .attr("url", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
}

pub fn expand_group(data: &ResourceData, default_organization: &str) -> Result<Group> {
    let organization_id = pick(data.get_str("organization"), default_organization);
    if organization_id.is_empty() {
        return Err(ProviderError::missing("organization"));
    }
    Ok(Group {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        organization_id,
        ..Default::default()
    })
}

pub fn flatten_group(group: &Group) -> AttributeMap {
    attrs! {
        "name" => &group.name,
        "description" => &group.description,
        "organization" => &group.organization_id,
        "url" => &group.url,
        "created_at" => timestamp_value(group.created_at.as_ref()),
    }
}

#[async_trait]
impl Resource for IamGroupResource {
    fn kind(&self) -> &'static str {
        "oasis_iam_group"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let group = expand_group(data, session.default_organization())?;
        let created = session.iam().create_group(&group).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let group = session.iam().get_group(data.id()).await?;
        data.set_all(flatten_group(&group));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let iam = session.iam();
        let id = data.id().to_string();
        let mut group = fetch_for_update(data, iam.get_group(&id)).await?;
        if data.has_change("name") {
            group.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            group.description = data.get_string("description");
        }
        iam.update_group(&group).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.iam().delete_group(data.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = ResourceData::new(attrs! {
            "name" => "test-group",
            "description" => "test-description",
            "organization" => "org-1",
        });
        let flattened = flatten_group(&expand_group(&data, "").unwrap());
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_default_organization() {
        let data = ResourceData::new(attrs! { "name" => "g" });
        assert_eq!(expand_group(&data, "org-default").unwrap().organization_id, "org-default");
        assert!(expand_group(&data, "").is_err());
    }
}
