use crate::attrs;
use crate::error::Result;
use crate::helpers::unique_resource_id;
use crate::oasis::notebook::NotebookModel;
use crate::resource::{DataSource, Session};
use crate::schema::{Attribute, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

/// Notebook models a deployment can run
pub struct NotebookModelDataSource;

fn model_schema() -> Schema {
    Schema::nested()
        .attr("id", Attribute::string().computed())
        .attr("name", Attribute::string().computed())
        .attr("min_disk_size", Attribute::int().computed())
        .attr("max_disk_size", Attribute::int().computed())
        .attr("cpu", Attribute::float().computed())
        .attr("memory", Attribute::int().computed())
}

pub fn flatten_models(models: &[NotebookModel]) -> Vec<AttributeValue> {
    models
        .iter()
        .map(|m| {
            AttributeValue::Block(attrs! {
                "id" => &m.id,
                "name" => &m.name,
                "min_disk_size" => m.min_disk_size,
                "max_disk_size" => m.max_disk_size,
                "cpu" => m.cpu,
                "memory" => m.memory,
            })
        })
        .collect()
}

#[async_trait]
impl DataSource for NotebookModelDataSource {
    fn kind(&self) -> &'static str {
        "oasis_notebook_model"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("deployment_id", Attribute::string().required())
            .attr(
                "models",
                Attribute::list_of(AttributeType::Object(model_schema())).computed(),
            )
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let deployment_id = data.require_str("deployment_id")?.to_string();
        let models = session.notebook().list_notebook_models(&deployment_id).await?;
        data.set("models", flatten_models(&models));
        data.set_id(unique_resource_id("notebook-models-"));
        Ok(())
    }
}
