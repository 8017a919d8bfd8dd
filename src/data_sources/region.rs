use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::hash_ids;
use crate::oasis::platform::Region;
use crate::resource::{DataSource, Session};
use crate::schema::{Attribute, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

/// Regions of one cloud provider
pub struct RegionDataSource;

fn region_schema() -> Schema {
    Schema::nested()
        .attr("id", Attribute::string().computed())
        .attr("provider_id", Attribute::string().computed())
        .attr("location", Attribute::string().computed())
        .attr("available", Attribute::bool().computed())
}

pub fn flatten_regions(regions: &[Region]) -> Vec<AttributeValue> {
    regions
        .iter()
        .map(|r| {
            AttributeValue::Block(attrs! {
                "id" => &r.id,
                "provider_id" => &r.provider_id,
                "location" => &r.location,
                "available" => r.available,
            })
        })
        .collect()
}

#[async_trait]
impl DataSource for RegionDataSource {
    fn kind(&self) -> &'static str {
        "oasis_region"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("provider_id", Attribute::string().required())
            .attr("organization", Attribute::string().optional())
            .attr(
                "regions",
                Attribute::list_of(AttributeType::Object(region_schema())).computed(),
            )
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let provider_id = data.require_str("provider_id")?.to_string();
        let organization = session.organization_or(data.get_str("organization"));
        if organization.is_empty() {
            return Err(ProviderError::missing("organization"));
        }
        let regions = session.platform().list_regions(&provider_id, &organization).await?;
        data.set("organization", organization);
        data.set("regions", flatten_regions(&regions));
        data.set_id(hash_ids(regions.iter().map(|r| r.id.as_str())));
        Ok(())
    }
}
