//! Project resource

use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::timestamp_value;
use crate::oasis::resourcemanager::Project;
use crate::resource::session::pick;
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::diff::suppress_empty_string;
use crate::schema::{Attribute, AttributeMap, ResourceData, Schema};
use async_trait::async_trait;

pub struct ProjectResource;

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr(
            "organization",
            Attribute::string()
                .optional()
                .computed()
                .force_new()
                .suppress_diff(suppress_empty_string)
                .describe("Organization id; defaults to the provider organization"),
        )
        .attr("locked", Attribute::bool().optional())
        .attr("created_at", Attribute::string().computed())
        .attr("is_deleted", Attribute::bool().computed())
}

pub fn expand_project(data: &ResourceData, default_organization: &str) -> Result<Project> {
    let organization_id = pick(data.get_str("organization"), default_organization);
    if organization_id.is_empty() {
        return Err(ProviderError::missing("organization"));
    }
    Ok(Project {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        organization_id,
        locked: data.get_bool("locked"),
        ..Default::default()
    })
}

pub fn flatten_project(project: &Project) -> AttributeMap {
    attrs! {
        "name" => &project.name,
        "description" => &project.description,
        "organization" => &project.organization_id,
        "locked" => project.locked,
        "created_at" => timestamp_value(project.created_at.as_ref()),
        "is_deleted" => project.is_deleted,
    }
}

#[async_trait]
impl Resource for ProjectResource {
    fn kind(&self) -> &'static str {
        "oasis_project"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let project = expand_project(data, session.default_organization())?;
        let created = session.resource_manager().create_project(&project).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let project = session.resource_manager().get_project(data.id()).await?;
        data.set_all(flatten_project(&project));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let rm = session.resource_manager();
        let id = data.id().to_string();
        let mut project = fetch_for_update(data, rm.get_project(&id)).await?;

        if data.has_change("name") {
            project.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            project.description = data.get_string("description");
        }
        if data.has_change("locked") {
            project.locked = data.get_bool("locked");
        }
        rm.update_project(&project).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.resource_manager().delete_project(data.id()).await
    }
}
