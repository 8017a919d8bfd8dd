//! Backup resource

use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::{optional_day_range_validator, timestamp_value, validate_day_range};
use crate::oasis::backup::Backup;
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::{Attribute, AttributeMap, ResourceData, Schema};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

pub struct BackupResource;

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("deployment_id", Attribute::string().required().force_new())
        .attr(
            "upload",
            Attribute::bool()
                .optional()
                .default_value(false)
                .describe("Upload the backup to external storage"),
        )
        .attr(
            "auto_deleted_at",
            Attribute::int()
                .optional()
                .validate(optional_day_range_validator)
                .describe("Days until the backup is deleted (1-31); 0 keeps it"),
        )
        .attr("url", Attribute::string().computed())
        .attr("backup_policy_id", Attribute::string().computed())
        .attr("region_id", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
}

/// Deletion time `days` from `now`; zero or unset disables auto-deletion
pub fn expand_auto_deleted_at(data: &ResourceData, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    let Some(days) = data.get_ok("auto_deleted_at").and_then(|v| v.as_int()) else {
        return Ok(None);
    };
    validate_day_range(days).map_err(|message| ProviderError::malformed("auto_deleted_at", message))?;
    Ok(Some(now + Duration::days(days)))
}

pub fn expand_backup(data: &ResourceData) -> Result<Backup> {
    Ok(Backup {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        deployment_id: data.require_str("deployment_id")?.to_string(),
        upload: data.get_bool("upload"),
        auto_deleted_at: expand_auto_deleted_at(data, Utc::now())?,
        ..Default::default()
    })
}

/// Attributes shared by backups and their cross-region copies
pub fn flatten_backup(backup: &Backup) -> AttributeMap {
    attrs! {
        "id" => &backup.id,
        "name" => &backup.name,
        "description" => &backup.description,
        "url" => &backup.url,
        "created_at" => timestamp_value(backup.created_at.as_ref()),
        "backup_policy_id" => &backup.backup_policy_id,
        "deployment_id" => &backup.deployment_id,
        "region_id" => &backup.region_id,
    }
}

/// Refresh a backup view from the remote backup
pub async fn read_backup(session: &Session, data: &mut ResourceData) -> Result<()> {
    let backup = session.backup().get_backup(data.id()).await?;
    data.set_all(flatten_backup(&backup));
    Ok(())
}

#[async_trait]
impl Resource for BackupResource {
    fn kind(&self) -> &'static str {
        "oasis_backup"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let backup = expand_backup(data)?;
        session
            .data()
            .get_deployment(&backup.deployment_id)
            .await
            .map_err(|err| match err {
                ProviderError::NotFound(_) => ProviderError::invalid(format!(
                    "deployment {} does not exist",
                    backup.deployment_id
                )),
                other => other,
            })?;
        let created = session.backup().create_backup(&backup).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        read_backup(session, data).await
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let client = session.backup();
        let id = data.id().to_string();
        let mut backup = fetch_for_update(data, client.get_backup(&id)).await?;

        if data.has_change("name") {
            backup.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            backup.description = data.get_string("description");
        }
        if data.has_change("upload") {
            backup.upload = data.get_bool("upload");
        }
        if data.has_change("auto_deleted_at") {
            backup.auto_deleted_at = expand_auto_deleted_at(data, Utc::now())?;
        }
        client.update_backup(&backup).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.backup().delete_backup(data.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{validate, AttributeValue};
    use chrono::TimeZone;

    #[test]
    fn test_flatten_backup() {
        let backup = Backup {
            id: "test-id".into(),
            url: "https://test.url".into(),
            name: "test-name".into(),
            description: "test-description".into(),
            created_at: Some(Utc.with_ymd_and_hms(2022, 1, 1, 1, 1, 1).unwrap()),
            backup_policy_id: "test-policy-id".into(),
            deployment_id: "test-dep-id".into(),
            region_id: "gcp-europe-west4".into(),
            ..Default::default()
        };
        let expected = attrs! {
            "id" => "test-id",
            "name" => "test-name",
            "description" => "test-description",
            "url" => "https://test.url",
            "created_at" => "2022-01-01T01:01:01Z",
            "backup_policy_id" => "test-policy-id",
            "deployment_id" => "test-dep-id",
            "region_id" => "gcp-europe-west4",
        };
        assert_eq!(flatten_backup(&backup), expected);
    }

    #[test]
    fn test_round_trip() {
        let data = ResourceData::new(attrs! {
            "name" => "test-name",
            "description" => "test-description",
            "deployment_id" => "test-dep-id",
        });
        let flattened = flatten_backup(&expand_backup(&data).unwrap());
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_auto_delete_out_of_range() {
        for days in [-1, 32] {
            let data = ResourceData::new(attrs! {
                "name" => "b",
                "deployment_id" => "d",
                "auto_deleted_at" => days,
            });
            let err = expand_backup(&data).unwrap_err();
            assert!(matches!(err, ProviderError::Malformed { .. }));
            assert!(err.to_string().contains("must be within range 1-31"), "{days}");
            assert_eq!(validate(&schema(), data.state()).len(), 1, "{days}");
        }
        let err = validate_day_range(0).unwrap_err();
        assert!(err.contains("must be within range 1-31"));
    }

    #[test]
    fn test_auto_delete_zero_disables() {
        let data = ResourceData::new(attrs! {
            "name" => "b",
            "deployment_id" => "d",
            "auto_deleted_at" => 0,
        });
        assert!(validate(&schema(), data.state()).is_empty());
        assert!(expand_backup(&data).unwrap().auto_deleted_at.is_none());
    }

    #[test]
    fn test_auto_delete_in_days() {
        let now = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let data = ResourceData::new(attrs! { "auto_deleted_at" => 3 });
        let at = expand_auto_deleted_at(&data, now).unwrap().unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2022, 1, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_required_attributes() {
        for required in ["name", "deployment_id"] {
            let mut data = ResourceData::new(attrs! { "name" => "b", "deployment_id" => "d" });
            data.state_mut().remove(required);
            let err = expand_backup(&data).unwrap_err();
            assert!(err.to_string().contains(required));
        }
        assert!(schema().get("upload").unwrap().default == Some(AttributeValue::Bool(false)));
    }
}
