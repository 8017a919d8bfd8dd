use super::lookup_id;
use crate::error::Result;
use crate::resource::{DataSource, Session};
use crate::resources::project::flatten_project;
use crate::schema::{Attribute, ResourceData, Schema};
use async_trait::async_trait;

pub struct ProjectDataSource;

#[async_trait]
impl DataSource for ProjectDataSource {
    fn kind(&self) -> &'static str {
        "oasis_project"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("id", lookup_id())
            .attr("name", Attribute::string().computed())
            .attr("description", Attribute::string().computed())
            .attr("organization", Attribute::string().computed())
            .attr("locked", Attribute::bool().computed())
            .attr("created_at", Attribute::string().computed())
            .attr("is_deleted", Attribute::bool().computed())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let project = session.resource_manager().get_project(data.id()).await?;
        data.set_all(flatten_project(&project));
        data.set_id(&project.id);
        Ok(())
    }
}
