use super::lookup_id;
use crate::error::Result;
use crate::resource::{DataSource, Session};
use crate::resources::backup::read_backup;
use crate::schema::{Attribute, ResourceData, Schema};
use async_trait::async_trait;

pub struct BackupDataSource;

#[async_trait]
impl DataSource for BackupDataSource {
    fn kind(&self) -> &'static str {
        "oasis_backup"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("id", lookup_id())
            .attr("name", Attribute::string().computed())
            .attr("description", Attribute::string().computed())
            .attr("url", Attribute::string().computed())
            .attr("deployment_id", Attribute::string().computed())
            .attr("backup_policy_id", Attribute::string().computed())
            .attr("region_id", Attribute::string().computed())
            .attr("created_at", Attribute::string().computed())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        read_backup(session, data).await
    }
}
