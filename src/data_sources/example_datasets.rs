use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::{timestamp_value, unique_resource_id};
use crate::oasis::example::ExampleDataset;
use crate::resource::{DataSource, Session};
use crate::schema::{Attribute, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

/// Example datasets that can be installed into a deployment
pub struct ExampleDatasetsDataSource;

fn dataset_schema() -> Schema {
    Schema::nested()
        .attr("id", Attribute::string().computed())
        .attr("name", Attribute::string().computed())
        .attr("description", Attribute::string().computed())
        .attr("guide", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
}

pub fn flatten_datasets(datasets: &[ExampleDataset]) -> Vec<AttributeValue> {
    datasets
        .iter()
        .map(|d| {
            AttributeValue::Block(attrs! {
                "id" => &d.id,
                "name" => &d.name,
                "description" => &d.description,
                "guide" => &d.guide,
                "created_at" => timestamp_value(d.created_at.as_ref()),
            })
        })
        .collect()
}

#[async_trait]
impl DataSource for ExampleDatasetsDataSource {
    fn kind(&self) -> &'static str {
        "oasis_example_datasets"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("organization", Attribute::string().optional())
            .attr(
                "example_datasets",
                Attribute::list_of(AttributeType::Object(dataset_schema())).computed(),
            )
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let organization = session.organization_or(data.get_str("organization"));
        if organization.is_empty() {
            return Err(ProviderError::missing("organization"));
        }
        let datasets = session.example().list_example_datasets(&organization).await?;
        data.set("example_datasets", flatten_datasets(&datasets));
        data.set_id(unique_resource_id("example-datasets-"));
        Ok(())
    }
}
