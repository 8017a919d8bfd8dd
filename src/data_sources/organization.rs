use super::lookup_id;
use crate::attrs;
use crate::error::Result;
use crate::helpers::{hash_ids, timestamp_value};
use crate::oasis::resourcemanager::{Organization, Tier};
use crate::resource::{DataSource, Session};
use crate::schema::{Attribute, AttributeMap, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

fn tier_schema() -> Schema {
    Schema::nested()
        .attr("id", Attribute::string().computed())
        .attr("name", Attribute::string().computed())
        .attr("has_support_plans", Attribute::bool().computed())
        .attr("has_backup_uploads", Attribute::bool().computed())
        .attr("requires_terms_and_conditions", Attribute::bool().computed())
}

fn organization_fields(schema: Schema) -> Schema {
    schema
        .attr("name", Attribute::string().computed())
        .attr("description", Attribute::string().computed())
        .attr("url", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
        .attr(
            "tier",
            Attribute::set_of(AttributeType::Object(tier_schema())).computed(),
        )
}

fn flatten_tier(tier: &Tier) -> AttributeValue {
    AttributeValue::single_block(attrs! {
        "id" => &tier.id,
        "name" => &tier.name,
        "has_support_plans" => tier.has_support_plans,
        "has_backup_uploads" => tier.has_backup_uploads,
        "requires_terms_and_conditions" => tier.requires_terms_and_conditions,
    })
}

/// Lookup view of an organization, including its tier
pub fn flatten_organization_lookup(org: &Organization) -> AttributeMap {
    let mut values = attrs! {
        "id" => &org.id,
        "name" => &org.name,
        "description" => &org.description,
        "url" => &org.url,
        "created_at" => timestamp_value(org.created_at.as_ref()),
    };
    if let Some(tier) = &org.tier {
        values.insert("tier".into(), flatten_tier(tier));
    }
    values
}

/// One organization by id
pub struct OrganizationDataSource;

#[async_trait]
impl DataSource for OrganizationDataSource {
    fn kind(&self) -> &'static str {
        "oasis_organization"
    }

    fn schema(&self) -> Schema {
        organization_fields(Schema::new().attr("id", lookup_id()))
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let org = session.resource_manager().get_organization(data.id()).await?;
        data.set_all(flatten_organization_lookup(&org));
        Ok(())
    }
}

/// Every organization the caller belongs to
pub struct OrganizationsDataSource;

#[async_trait]
impl DataSource for OrganizationsDataSource {
    fn kind(&self) -> &'static str {
        "oasis_organizations"
    }

    fn schema(&self) -> Schema {
        Schema::new().attr(
            "organizations",
            Attribute::list_of(AttributeType::Object(organization_fields(
                Schema::nested().attr("id", Attribute::string().computed()),
            )))
            .computed(),
        )
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let orgs = session.resource_manager().list_my_organizations().await?;
        let items: Vec<AttributeValue> = orgs
            .iter()
            .map(|org| AttributeValue::Block(flatten_organization_lookup(org)))
            .collect();
        data.set("organizations", items);
        data.set_id(hash_ids(orgs.iter().map(|org| org.id.as_str())));
        Ok(())
    }
}
