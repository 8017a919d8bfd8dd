//! Organization resource

use crate::error::Result;
use crate::helpers::timestamp_value;
use crate::oasis::resourcemanager::{AuthenticationProviders, Organization};
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::data::BlockExt;
use crate::schema::{Attribute, AttributeMap, AttributeValue, ResourceData, Schema};
use crate::attrs;
use async_trait::async_trait;

pub struct OrganizationResource;

const PROVIDER_FLAGS: [&str; 5] = [
    "enable_github",
    "enable_google",
    "enable_microsoft",
    "enable_username_password",
    "enable_sso",
];

fn authentication_providers_schema() -> Schema {
    PROVIDER_FLAGS.into_iter().fold(Schema::nested(), |schema, flag| {
        schema.attr(flag, Attribute::bool().optional().default_value(false))
    })
}

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required().describe("Organization name"))
        .attr("description", Attribute::string().optional())
        .attr("locked", Attribute::bool().optional().describe("Prevents deletion while set"))
        .attr(
            "authentication_providers",
            Attribute::single_block(authentication_providers_schema())
                .optional()
                .computed(),
        )
        .attr("url", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
        .attr("is_deleted", Attribute::bool().computed())
}

/// Authentication providers from the view; absent flags are off
pub fn expand_authentication_providers(data: &ResourceData) -> Option<AuthenticationProviders> {
    let block = data.get_block("authentication_providers")?;
    Some(AuthenticationProviders {
        enable_github: block.bool_of("enable_github"),
        enable_google: block.bool_of("enable_google"),
        enable_microsoft: block.bool_of("enable_microsoft"),
        enable_username_password: block.bool_of("enable_username_password"),
        enable_sso: block.bool_of("enable_sso"),
    })
}

pub fn expand_organization(data: &ResourceData) -> Result<Organization> {
    Ok(Organization {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        locked: data.get_bool("locked"),
        authentication_providers: expand_authentication_providers(data),
        ..Default::default()
    })
}

fn flatten_authentication_providers(providers: &AuthenticationProviders) -> AttributeValue {
    AttributeValue::single_block(attrs! {
        "enable_github" => providers.enable_github,
        "enable_google" => providers.enable_google,
        "enable_microsoft" => providers.enable_microsoft,
        "enable_username_password" => providers.enable_username_password,
        "enable_sso" => providers.enable_sso,
    })
}

pub fn flatten_organization(org: &Organization) -> AttributeMap {
    let mut values = attrs! {
        "name" => &org.name,
        "description" => &org.description,
        "locked" => org.locked,
        "url" => &org.url,
        "created_at" => timestamp_value(org.created_at.as_ref()),
        "is_deleted" => org.is_deleted,
    };
    if let Some(providers) = &org.authentication_providers {
        values.insert(
            "authentication_providers".into(),
            flatten_authentication_providers(providers),
        );
    }
    values
}

#[async_trait]
impl Resource for OrganizationResource {
    fn kind(&self) -> &'static str {
        "oasis_organization"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let org = expand_organization(data)?;
        let created = session.resource_manager().create_organization(&org).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let org = session.resource_manager().get_organization(data.id()).await?;
        data.set_all(flatten_organization(&org));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let rm = session.resource_manager();
        let id = data.id().to_string();
        let mut org = fetch_for_update(data, rm.get_organization(&id)).await?;

        if data.has_change("name") {
            org.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            org.description = data.get_string("description");
        }
        if data.has_change("locked") {
            org.locked = data.get_bool("locked");
        }
        // Recomputed as a whole; single flags are not tracked
        if let Some(providers) = expand_authentication_providers(data) {
            org.authentication_providers = Some(providers);
        }
        rm.update_organization(&org).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.resource_manager().delete_organization(data.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::schema::validate;
    use chrono::{TimeZone, Utc};

    fn full_view() -> ResourceData {
        ResourceData::new(attrs! {
            "name" => "test-name",
            "description" => "test-description",
            "locked" => true,
            "authentication_providers" => AttributeValue::single_block(attrs! {
                "enable_github" => true,
                "enable_google" => false,
                "enable_microsoft" => true,
                "enable_username_password" => false,
                "enable_sso" => true,
            }),
        })
    }

    #[test]
    fn test_round_trip() {
        let data = full_view();
        let org = expand_organization(&data).unwrap();
        let flattened = flatten_organization(&org);
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let mut data = full_view();
        data.state_mut().remove("name");
        let err = expand_organization(&data).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { ref attribute, .. } if attribute == "name"));
        assert!(!validate(&schema(), data.state()).is_empty());
    }

    #[test]
    fn test_providers_absent_flags_default_off() {
        let data = ResourceData::new(attrs! {
            "name" => "org",
            "authentication_providers" => AttributeValue::single_block(attrs! { "enable_sso" => true }),
        });
        let providers = expand_authentication_providers(&data).unwrap();
        assert!(providers.enable_sso);
        assert!(!providers.enable_github);
    }

    #[test]
    fn test_flatten_formats_created_at() {
        let org = Organization {
            id: "test-id".into(),
            name: "test-name".into(),
            created_at: Some(Utc.with_ymd_and_hms(1980, 1, 1, 1, 1, 1).unwrap()),
            ..Default::default()
        };
        let flattened = flatten_organization(&org);
        assert_eq!(flattened["created_at"], AttributeValue::from("1980-01-01T01:01:01Z"));
        assert!(!flattened.contains_key("authentication_providers"));
    }
}
