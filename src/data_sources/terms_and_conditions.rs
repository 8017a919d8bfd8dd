use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::timestamp_value;
use crate::oasis::resourcemanager::TermsAndConditions;
use crate::resource::{DataSource, Session};
use crate::schema::{Attribute, AttributeMap, ResourceData, Schema};
use async_trait::async_trait;

/// Terms and conditions by id, or the current terms of an organization
pub struct TermsAndConditionsDataSource;

pub fn flatten_terms(terms: &TermsAndConditions) -> AttributeMap {
    attrs! {
        "content" => &terms.content,
        "created_at" => timestamp_value(terms.created_at.as_ref()),
    }
}

#[async_trait]
impl DataSource for TermsAndConditionsDataSource {
    fn kind(&self) -> &'static str {
        "oasis_terms_and_conditions"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("id", Attribute::string().optional().computed())
            .attr("organization", Attribute::string().optional())
            .attr("content", Attribute::string().computed())
            .attr("created_at", Attribute::string().computed())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let client = session.resource_manager();
        let terms = if data.has_id() {
            client.get_terms_and_conditions(data.id()).await?
        } else {
            let organization = session.organization_or(data.get_str("organization"));
            if organization.is_empty() {
                return Err(ProviderError::missing("organization"));
            }
            client.get_current_terms_and_conditions(&organization).await?
        };
        data.set_all(flatten_terms(&terms));
        data.set_id(&terms.id);
        Ok(())
    }
}
