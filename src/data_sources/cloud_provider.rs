use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::hash_ids;
use crate::oasis::platform::CloudProvider;
use crate::resource::{DataSource, Session};
use crate::schema::{Attribute, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

/// Cloud providers available to an organization
pub struct CloudProviderDataSource;

fn provider_schema() -> Schema {
    Schema::nested()
        .attr("id", Attribute::string().computed())
        .attr("name", Attribute::string().computed())
}

pub fn flatten_providers(providers: &[CloudProvider]) -> Vec<AttributeValue> {
    providers
        .iter()
        .map(|p| AttributeValue::Block(attrs! { "id" => &p.id, "name" => &p.name }))
        .collect()
}

#[async_trait]
impl DataSource for CloudProviderDataSource {
    fn kind(&self) -> &'static str {
        "oasis_cloud_provider"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr(
                "organization",
                Attribute::string()
                    .optional()
                    .describe("Defaults to the provider organization"),
            )
            .attr(
                "providers",
                Attribute::list_of(AttributeType::Object(provider_schema())).computed(),
            )
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let organization = session.organization_or(data.get_str("organization"));
        if organization.is_empty() {
            return Err(ProviderError::missing("organization"));
        }
        let providers = session.platform().list_providers(&organization).await?;
        data.set("organization", organization);
        data.set("providers", flatten_providers(&providers));
        data.set_id(hash_ids(providers.iter().map(|p| p.id.as_str())));
        Ok(())
    }
}
