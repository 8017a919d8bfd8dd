//! Example dataset installation resource

use crate::attrs;
use crate::error::Result;
use crate::helpers::timestamp_value;
use crate::oasis::example::{ExampleDatasetInstallation, InstallationStatus};
use crate::resource::{Resource, Session};
use crate::schema::{Attribute, AttributeMap, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

pub struct ExampleInstallationResource;

fn status_schema() -> Schema {
    Schema::nested()
        .attr("database_name", Attribute::string().computed())
        .attr("state", Attribute::string().computed())
        .attr("is_available", Attribute::bool().computed())
        .attr("is_failed", Attribute::bool().computed())
}

pub fn schema() -> Schema {
    Schema::new()
        .attr("deployment_id", Attribute::string().required().force_new())
        .attr("example_dataset_id", Attribute::string().required().force_new())
        .attr("created_at", Attribute::string().computed())
        .attr("status", Attribute::block(status_schema()).computed())
}

pub fn expand_installation(data: &ResourceData) -> Result<ExampleDatasetInstallation> {
    Ok(ExampleDatasetInstallation {
        deployment_id: data.require_str("deployment_id")?.to_string(),
        exampledataset_id: data.require_str("example_dataset_id")?.to_string(),
        ..Default::default()
    })
}

fn flatten_status(status: &InstallationStatus) -> AttributeValue {
    AttributeValue::single_block(attrs! {
        "database_name" => &status.database_name,
        "state" => &status.state,
        "is_available" => status.is_available,
        "is_failed" => status.is_failed,
    })
}

pub fn flatten_installation(installation: &ExampleDatasetInstallation) -> AttributeMap {
    let mut values = attrs! {
        "deployment_id" => &installation.deployment_id,
        "example_dataset_id" => &installation.exampledataset_id,
        "created_at" => timestamp_value(installation.created_at.as_ref()),
    };
    if let Some(status) = &installation.status {
        values.insert("status".into(), flatten_status(status));
    }
    values
}

#[async_trait]
impl Resource for ExampleInstallationResource {
    fn kind(&self) -> &'static str {
        "oasis_example_dataset_installation"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let installation = expand_installation(data)?;
        let created = session.example().create_installation(&installation).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let installation = session.example().get_installation(data.id()).await?;
        data.set_all(flatten_installation(&installation));
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.example().delete_installation(data.id()).await
    }
}
