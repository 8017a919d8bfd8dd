//! Multi-region backup: a copy of an existing backup in another region

use super::backup::read_backup;
use crate::error::{ProviderError, Result};
use crate::oasis::backup::CopyBackupRequest;
use crate::resource::{Resource, Session};
use crate::schema::{Attribute, ResourceData, Schema};
use async_trait::async_trait;

pub struct MultiRegionBackupResource;

pub fn schema() -> Schema {
    Schema::new()
        .attr(
            "source_backup_id",
            Attribute::string().required().force_new().describe("Backup to copy"),
        )
        .attr(
            "region_id",
            Attribute::string().required().force_new().describe("Region receiving the copy"),
        )
        .attr("name", Attribute::string().computed())
        .attr("description", Attribute::string().computed())
        .attr("url", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
        .attr("backup_policy_id", Attribute::string().computed())
        .attr("deployment_id", Attribute::string().computed())
}

pub fn expand_copy_request(data: &ResourceData) -> Result<CopyBackupRequest> {
    let source_backup_id = data.get_string("source_backup_id");
    if source_backup_id.is_empty() {
        return Err(ProviderError::malformed("source_backup_id", "Source backup identifier required"));
    }
    let region_id = data.get_string("region_id");
    if region_id.is_empty() {
        return Err(ProviderError::malformed("region_id", "Region identifier required"));
    }
    Ok(CopyBackupRequest {
        source_backup_id,
        region_id,
    })
}

#[async_trait]
impl Resource for MultiRegionBackupResource {
    fn kind(&self) -> &'static str {
        "oasis_multi_region_backup"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let request = expand_copy_request(data)?;
        let copy = session.backup().copy_backup(&request).await?;
        tracing::info!("Copied backup {} to {} as {}", request.source_backup_id, request.region_id, copy.id);
        data.set_id(&copy.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        read_backup(session, data).await
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.backup().delete_backup(data.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::schema::validate;

    #[test]
    fn test_missing_region() {
        let data = ResourceData::new(attrs! { "source_backup_id" => "backup-1", "region_id" => "" });
        assert!(validate(&schema(), data.state()).is_empty());
        let err = expand_copy_request(&data).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
        assert!(err.to_string().contains("Region identifier required"));
    }

    #[test]
    fn test_missing_source() {
        let data = ResourceData::new(attrs! { "source_backup_id" => "", "region_id" => "aws-us-east-2" });
        let err = expand_copy_request(&data).unwrap_err();
        assert!(err.to_string().contains("Source backup identifier required"));
    }

    #[test]
    fn test_expand() {
        let data = ResourceData::new(attrs! { "source_backup_id" => "backup-1", "region_id" => "aws-us-east-2" });
        let request = expand_copy_request(&data).unwrap();
        assert_eq!(request.source_backup_id, "backup-1");
        assert_eq!(request.region_id, "aws-us-east-2");
    }

    #[test]
    fn test_every_input_forces_replacement() {
        let schema = schema();
        assert!(schema.get("source_backup_id").unwrap().force_new);
        assert!(schema.get("region_id").unwrap().force_new);
    }
}
