//! Private endpoint service resource
//!
//! A private endpoint service exposes one deployment to one cloud provider
//! network. The provider block cannot be removed once set, and the service
//! has no delete operation.

use crate::attrs;
use crate::error::Result;
use crate::helpers::{expand_non_empty_string_list, timestamp_value};
use crate::oasis::network::{Aks, Aws, AwsPrincipals, Gcp, PrivateEndpointService};
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::data::BlockExt;
use crate::schema::diff::suppress_removed_block;
use crate::schema::{Attribute, AttributeMap, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;
use tracing::debug;

pub struct PrivateEndpointResource;

fn aks_schema() -> Schema {
    Schema::nested().attr(
        "az_client_subscription_ids",
        Attribute::list_of(AttributeType::String)
            .required()
            .describe("Azure client subscription ids allowed to connect"),
    )
}

fn principal_schema() -> Schema {
    Schema::nested()
        .attr("account_id", Attribute::string().required())
        .attr("user_names", Attribute::list_of(AttributeType::String).optional())
        .attr("role_names", Attribute::list_of(AttributeType::String).optional())
}

fn aws_schema() -> Schema {
    Schema::nested().attr(
        "principal",
        Attribute::list_of(AttributeType::Object(principal_schema()))
            .required()
            .min_items(1),
    )
}

fn gcp_schema() -> Schema {
    Schema::nested().attr(
        "projects",
        Attribute::list_of(AttributeType::String)
            .required()
            .describe("GCP projects allowed to connect"),
    )
}

fn provider_block(schema: Schema) -> Attribute {
    Attribute::single_block(schema)
        .optional()
        .suppress_diff(suppress_removed_block)
}

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("deployment", Attribute::string().required().force_new())
        .attr(
            "dns_names",
            Attribute::list_of(AttributeType::String)
                .optional()
                .describe("Alternate DNS names for the deployment"),
        )
        .attr("aks", provider_block(aks_schema()))
        .attr("aws", provider_block(aws_schema()))
        .attr("gcp", provider_block(gcp_schema()))
        .attr("created_at", Attribute::string().computed())
}

fn expand_aks(block: &AttributeMap) -> Aks {
    Aks {
        client_subscription_ids: expand_non_empty_string_list(block.list_of("az_client_subscription_ids")),
    }
}

fn expand_aws(block: &AttributeMap) -> Aws {
    Aws {
        principals: block
            .list_of("principal")
            .iter()
            .filter_map(AttributeValue::as_block)
            .map(|p| AwsPrincipals {
                account_id: p.str_of("account_id").to_string(),
                user_names: expand_non_empty_string_list(p.list_of("user_names")),
                role_names: expand_non_empty_string_list(p.list_of("role_names")),
            })
            .collect(),
    }
}

fn expand_gcp(block: &AttributeMap) -> Gcp {
    Gcp {
        projects: expand_non_empty_string_list(block.list_of("projects")),
    }
}

pub fn expand_private_endpoint(data: &ResourceData) -> Result<PrivateEndpointService> {
    Ok(PrivateEndpointService {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        deployment_id: data.require_str("deployment")?.to_string(),
        alternate_dns_names: expand_non_empty_string_list(data.get_list("dns_names")),
        aks: data.get_block("aks").map(expand_aks),
        aws: data.get_block("aws").map(expand_aws),
        gcp: data.get_block("gcp").map(expand_gcp),
        ..Default::default()
    })
}

fn flatten_aws(aws: &Aws) -> AttributeValue {
    let principals: Vec<AttributeValue> = aws
        .principals
        .iter()
        .map(|p| {
            AttributeValue::Block(attrs! {
                "account_id" => &p.account_id,
                "user_names" => p.user_names.clone(),
                "role_names" => p.role_names.clone(),
            })
        })
        .collect();
    AttributeValue::single_block(attrs! { "principal" => principals })
}

pub fn flatten_private_endpoint(service: &PrivateEndpointService) -> AttributeMap {
    let mut values = attrs! {
        "name" => &service.name,
        "description" => &service.description,
        "deployment" => &service.deployment_id,
        "dns_names" => service.alternate_dns_names.clone(),
        "created_at" => timestamp_value(service.created_at.as_ref()),
    };
    if let Some(aks) = &service.aks {
        values.insert(
            "aks".into(),
            AttributeValue::single_block(attrs! {
                "az_client_subscription_ids" => aks.client_subscription_ids.clone(),
            }),
        );
    }
    if let Some(aws) = &service.aws {
        values.insert("aws".into(), flatten_aws(aws));
    }
    if let Some(gcp) = &service.gcp {
        values.insert(
            "gcp".into(),
            AttributeValue::single_block(attrs! { "projects" => gcp.projects.clone() }),
        );
    }
    values
}

/// Copy changed attributes onto the fetched service
///
/// A provider block missing from configuration leaves the remote one alone.
pub fn apply_changes(data: &ResourceData, service: &mut PrivateEndpointService) {
    if data.has_change("name") {
        if let Some(name) = data.get_str("name").filter(|n| !n.is_empty()) {
            service.name = name.to_string();
        }
    }
    if data.has_change("description") {
        service.description = data.get_string("description");
    }
    if data.has_change("dns_names") {
        service.alternate_dns_names = expand_non_empty_string_list(data.get_list("dns_names"));
    }
    if data.has_change("aks") {
        if let Some(block) = data.get_block("aks") {
            service.aks = Some(expand_aks(block));
        }
    }
    if data.has_change("aws") {
        if let Some(block) = data.get_block("aws") {
            service.aws = Some(expand_aws(block));
        }
    }
    if data.has_change("gcp") {
        if let Some(block) = data.get_block("gcp") {
            service.gcp = Some(expand_gcp(block));
        }
    }
}

#[async_trait]
impl Resource for PrivateEndpointResource {
    fn kind(&self) -> &'static str {
        "oasis_private_endpoint"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let service = expand_private_endpoint(data)?;
        let created = session.network().create_private_endpoint_service(&service).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let service = session.network().get_private_endpoint_service(data.id()).await?;
        data.set_all(flatten_private_endpoint(&service));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let client = session.network();
        let id = data.id().to_string();
        let mut service = fetch_for_update(data, client.get_private_endpoint_service(&id)).await?;
        apply_changes(data, &mut service);
        client.update_private_endpoint_service(&service).await?;
        Ok(())
    }

    async fn delete(&self, _session: &Session, data: &mut ResourceData) -> Result<()> {
        debug!("Private endpoint service {} cannot be deleted remotely", data.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ResourceData {
        ResourceData::new(attrs! {
            "name" => "test-name",
            "description" => "test-description",
            "deployment" => "dep-1",
            "dns_names" => vec!["test.example.com".to_string()],
            "aws" => AttributeValue::single_block(attrs! {
                "principal" => vec![AttributeValue::Block(attrs! {
                    "account_id" => "123456789012",
                    "user_names" => vec!["alice".to_string()],
                    "role_names" => vec!["ops".to_string()],
                })],
            }),
        })
    }

    #[test]
    fn test_round_trip() {
        let data = view();
        let service = expand_private_endpoint(&data).unwrap();
        assert!(service.aks.is_none());
        assert!(service.gcp.is_none());
        assert_eq!(service.aws.as_ref().unwrap().principals[0].account_id, "123456789012");

        let flattened = flatten_private_endpoint(&service);
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_removed_provider_block_is_kept() {
        let prior = attrs! {
            "name" => "n",
            "deployment" => "dep-1",
            "gcp" => AttributeValue::single_block(attrs! { "projects" => vec!["p1".to_string()] }),
        };
        let planned = attrs! { "name" => "renamed", "deployment" => "dep-1" };
        let data = ResourceData::with_prior("pes-1", prior, planned);

        let mut service = PrivateEndpointService {
            id: "pes-1".into(),
            name: "n".into(),
            gcp: Some(Gcp { projects: vec!["p1".into()] }),
            ..Default::default()
        };
        apply_changes(&data, &mut service);
        assert_eq!(service.name, "renamed");
        assert_eq!(service.gcp, Some(Gcp { projects: vec!["p1".into()] }));
    }

    #[test]
    fn test_provider_block_suppresses_removal() {
        let attribute = schema().get("gcp").cloned().unwrap();
        let suppress = attribute.diff_suppress.unwrap();
        let old = AttributeValue::single_block(attrs! { "projects" => vec!["p1".to_string()] });
        assert!(suppress("gcp", &old, &AttributeValue::Null, &attrs! {}));
    }
}
