//! Notebook resource

use crate::attrs;
use crate::error::Result;
use crate::helpers::{expand_int32, timestamp_value};
use crate::oasis::notebook::{Notebook, NotebookModelSpec, NotebookStatus, NotebookUsage};
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::data::BlockExt;
use crate::schema::{Attribute, AttributeMap, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

pub struct NotebookResource;

fn model_schema() -> Schema {
    Schema::nested()
        .attr("notebook_model_id", Attribute::string().required())
        .attr("disk_size", Attribute::int().required().describe("Disk size in GiB"))
}

fn usage_schema() -> Schema {
    Schema::nested()
        .attr("last_memory_usage", Attribute::int().computed())
        .attr("last_cpu_usage", Attribute::float().computed())
        .attr("last_memory_limit", Attribute::int().computed())
        .attr("last_cpu_limit", Attribute::float().computed())
}

fn status_schema() -> Schema {
    Schema::nested()
        .attr("phase", Attribute::string().computed())
        .attr("message", Attribute::string().computed())
        .attr("last_updated_at", Attribute::string().computed())
        .attr("usage", Attribute::block(usage_schema()).computed())
}

pub fn schema() -> Schema {
    Schema::new()
        .attr("deployment_id", Attribute::string().required().force_new())
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("model", Attribute::single_block(model_schema()).required())
        .attr("url", Attribute::string().computed())
        .attr("is_paused", Attribute::bool().computed())
        .attr("last_paused_at", Attribute::string().computed())
        .attr("last_resumed_at", Attribute::string().computed())
        .attr("created_by_id", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
        .attr("is_deleted", Attribute::bool().computed())
        .attr("deleted_at", Attribute::string().computed())
        .attr("status", Attribute::block(status_schema()).computed())
}

fn expand_model(block: &AttributeMap) -> Result<NotebookModelSpec> {
    Ok(NotebookModelSpec {
        notebook_model_id: block.str_of("notebook_model_id").to_string(),
        disk_size: expand_int32("model.0.disk_size", block.int_of("disk_size"))?,
    })
}

pub fn expand_notebook(data: &ResourceData) -> Result<Notebook> {
    Ok(Notebook {
        deployment_id: data.require_str("deployment_id")?.to_string(),
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        model: Some(expand_model(data.require_block("model")?)?),
        ..Default::default()
    })
}

fn flatten_usage(usage: &NotebookUsage) -> AttributeValue {
    AttributeValue::single_block(attrs! {
        "last_memory_usage" => usage.last_memory_usage,
        "last_cpu_usage" => usage.last_cpu_usage,
        "last_memory_limit" => usage.last_memory_limit,
        "last_cpu_limit" => usage.last_cpu_limit,
    })
}

fn flatten_status(status: &NotebookStatus) -> AttributeValue {
    let mut values = attrs! {
        "phase" => &status.phase,
        "message" => &status.message,
        "last_updated_at" => timestamp_value(status.last_updated_at.as_ref()),
    };
    if let Some(usage) = &status.usage {
        values.insert("usage".into(), flatten_usage(usage));
    }
    AttributeValue::single_block(values)
}

pub fn flatten_notebook(notebook: &Notebook) -> AttributeMap {
    let mut values = attrs! {
        "deployment_id" => &notebook.deployment_id,
        "name" => &notebook.name,
        "description" => &notebook.description,
        "url" => &notebook.url,
        "is_paused" => notebook.is_paused,
        "last_paused_at" => timestamp_value(notebook.last_paused_at.as_ref()),
        "last_resumed_at" => timestamp_value(notebook.last_resumed_at.as_ref()),
        "created_by_id" => &notebook.created_by_id,
        "created_at" => timestamp_value(notebook.created_at.as_ref()),
        "is_deleted" => notebook.is_deleted,
        "deleted_at" => timestamp_value(notebook.deleted_at.as_ref()),
    };
    if let Some(model) = &notebook.model {
        values.insert(
            "model".into(),
            AttributeValue::single_block(attrs! {
                "notebook_model_id" => &model.notebook_model_id,
                "disk_size" => model.disk_size,
            }),
        );
    }
    if let Some(status) = &notebook.status {
        values.insert("status".into(), flatten_status(status));
    }
    values
}

#[async_trait]
impl Resource for NotebookResource {
    fn kind(&self) -> &'static str {
        "oasis_notebook"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let notebook = expand_notebook(data)?;
        let created = session.notebook().create_notebook(&notebook).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let notebook = session.notebook().get_notebook(data.id()).await?;
        data.set_all(flatten_notebook(&notebook));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let client = session.notebook();
        let id = data.id().to_string();
        let mut notebook = fetch_for_update(data, client.get_notebook(&id)).await?;
        if data.has_change("name") {
            notebook.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            notebook.description = data.get_string("description");
        }
        if data.has_change("model") {
            notebook.model = Some(expand_model(data.require_block("model")?)?);
        }
        client.update_notebook(&notebook).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.notebook().delete_notebook(data.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;
    use chrono::{TimeZone, Utc};

    fn view() -> ResourceData {
        ResourceData::new(attrs! {
            "deployment_id" => "dep-1",
            "name" => "test-notebook",
            "description" => "test-description",
            "model" => AttributeValue::single_block(attrs! {
                "notebook_model_id" => "basic",
                "disk_size" => 10,
            }),
        })
    }

    #[test]
    fn test_round_trip() {
        let data = view();
        let flattened = flatten_notebook(&expand_notebook(&data).unwrap());
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_required_attributes() {
        for required in ["deployment_id", "name", "model"] {
            let mut data = view();
            data.state_mut().remove(required);
            assert!(expand_notebook(&data).unwrap_err().to_string().contains(required));
            assert_eq!(validate(&schema(), data.state()).len(), 1, "{required}");
        }
    }

    #[test]
    fn test_flatten_status_and_usage() {
        let notebook = Notebook {
            status: Some(NotebookStatus {
                phase: "Running".into(),
                message: String::new(),
                last_updated_at: Some(Utc.with_ymd_and_hms(2022, 1, 1, 1, 1, 1).unwrap()),
                usage: Some(NotebookUsage {
                    last_memory_usage: 512,
                    last_cpu_usage: 0.5,
                    last_memory_limit: 1024,
                    last_cpu_limit: 1.0,
                }),
            }),
            ..Default::default()
        };
        let flattened = flatten_notebook(&notebook);
        let status = flattened["status"].first_block().unwrap();
        assert_eq!(status["phase"], AttributeValue::from("Running"));
        assert_eq!(status["last_updated_at"], AttributeValue::from("2022-01-01T01:01:01Z"));
        let usage = status["usage"].first_block().unwrap();
        assert_eq!(usage["last_cpu_usage"], AttributeValue::Float(0.5));
        assert_eq!(usage["last_memory_limit"], AttributeValue::Int(1024));
    }
}
