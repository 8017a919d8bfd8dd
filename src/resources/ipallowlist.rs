//! IP allowlist resource

use super::set_present;
use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::{cidr_validator, expand_cidr_list, timestamp_value};
use crate::oasis::security::IpAllowlist;
use crate::resource::session::pick;
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::{Attribute, AttributeMap, AttributeType, ResourceData, Schema};
use async_trait::async_trait;

pub struct IpAllowlistResource;

const READ_ONLY: &[&str] = &["created_at", "cidr_ranges"];

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("project", Attribute::string().optional().computed().force_new())
        .attr(
            "cidr_ranges",
            Attribute::list_of(AttributeType::String)
                .required()
                .min_items(1)
                .validate(cidr_validator),
        )
        .attr("remote_inspection_allowed", Attribute::bool().optional())
        .attr("locked", Attribute::bool().optional())
        .attr("created_at", Attribute::string().computed())
}

pub fn expand_ip_allowlist(data: &ResourceData, default_project: &str) -> Result<IpAllowlist> {
    let project_id = pick(data.get_str("project"), default_project);
    if project_id.is_empty() {
        return Err(ProviderError::missing("project"));
    }
    if data.get("cidr_ranges").is_none() {
        return Err(ProviderError::missing("cidr_ranges"));
    }
    Ok(IpAllowlist {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        project_id,
        cidr_ranges: expand_cidr_list("cidr_ranges", data.get_list("cidr_ranges"))?,
        remote_inspection_allowed: data.get_bool("remote_inspection_allowed"),
        locked: data.get_bool("locked"),
        ..Default::default()
    })
}

pub fn flatten_ip_allowlist(list: &IpAllowlist) -> AttributeMap {
    attrs! {
        "name" => &list.name,
        "description" => &list.description,
        "project" => &list.project_id,
        "cidr_ranges" => list.cidr_ranges.clone(),
        "remote_inspection_allowed" => list.remote_inspection_allowed,
        "locked" => list.locked,
        "created_at" => timestamp_value(list.created_at.as_ref()),
    }
}

#[async_trait]
impl Resource for IpAllowlistResource {
    fn kind(&self) -> &'static str {
        "oasis_ipallowlist"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let list = expand_ip_allowlist(data, session.default_project())?;
        let created = session.security().create_ip_allowlist(&list).await?;
        data.set_id(&created.id);
        if data.get_ok("project").is_none() {
            data.set("project", &created.project_id);
        }
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let list = session.security().get_ip_allowlist(data.id()).await?;
        set_present(data, flatten_ip_allowlist(&list), READ_ONLY);
        Ok(())
    }

    async fn import(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let list = session.security().get_ip_allowlist(data.id()).await?;
        data.set_all(flatten_ip_allowlist(&list));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let client = session.security();
        let id = data.id().to_string();
        let mut list = fetch_for_update(data, client.get_ip_allowlist(&id)).await?;

        if data.has_change("name") {
            list.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            list.description = data.get_string("description");
        }
        if data.has_change("cidr_ranges") {
            list.cidr_ranges = expand_cidr_list("cidr_ranges", data.get_list("cidr_ranges"))?;
        }
        if data.has_change("remote_inspection_allowed") {
            list.remote_inspection_allowed = data.get_bool("remote_inspection_allowed");
        }
        if data.has_change("locked") {
            list.locked = data.get_bool("locked");
        }
        client.update_ip_allowlist(&list).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.security().delete_ip_allowlist(data.id()).await
    }
}
