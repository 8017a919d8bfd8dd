//! Audit log resource
//!
//! An organization has at most one default audit log. Turning `is_default`
//! on points the organization at this log; turning it off clears the
//! organization default.

use crate::attrs;
use crate::error::Result;
use crate::helpers::timestamp_value;
use crate::oasis::audit::{AuditLog, Destination, DESTINATION_CLOUD};
use crate::resource::{ensure_unchanged, fetch_for_update, Resource, Session};
use crate::schema::{Attribute, AttributeMap, ResourceData, Schema};
use async_trait::async_trait;
use tracing::info;

pub struct AuditLogResource;

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr(
            "organization",
            Attribute::string().required().describe("Fixed once the audit log exists"),
        )
        .attr("is_default", Attribute::bool().optional().default_value(false))
        .attr("created_at", Attribute::string().computed())
}

pub fn expand_audit_log(data: &ResourceData) -> Result<AuditLog> {
    Ok(AuditLog {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        organization_id: data.require_str("organization")?.to_string(),
        is_default: data.get_bool("is_default"),
        destinations: vec![Destination {
            kind: DESTINATION_CLOUD.to_string(),
        }],
        ..Default::default()
    })
}

pub fn flatten_audit_log(log: &AuditLog) -> AttributeMap {
    attrs! {
        "name" => &log.name,
        "description" => &log.description,
        "organization" => &log.organization_id,
        "is_default" => log.is_default,
        "created_at" => timestamp_value(log.created_at.as_ref()),
    }
}

/// Audit log id to make the organization default, if `is_default` changed
///
/// `Some("")` clears the default.
pub fn default_transition<'a>(data: &'a ResourceData) -> Option<&'a str> {
    if !data.has_change("is_default") {
        return None;
    }
    if data.get_bool("is_default") {
        Some(data.id())
    } else if data.is_new() {
        None
    } else {
        Some("")
    }
}

#[async_trait]
impl Resource for AuditLogResource {
    fn kind(&self) -> &'static str {
        "oasis_auditlog"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let log = expand_audit_log(data)?;
        let created = session.audit().create_audit_log(&log).await?;
        data.set_id(&created.id);
        if log.is_default && !created.is_default {
            info!("Making audit log {} the default of {}", created.id, log.organization_id);
            session
                .audit()
                .set_default_audit_log(&log.organization_id, &created.id)
                .await?;
        }
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let log = session.audit().get_audit_log(data.id()).await?;
        data.set_all(flatten_audit_log(&log));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        ensure_unchanged(data, "organization")?;
        let client = session.audit();
        let id = data.id().to_string();
        let mut log = fetch_for_update(data, client.get_audit_log(&id)).await?;

        if data.has_change("name") {
            log.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            log.description = data.get_string("description");
        }
        client.update_audit_log(&log).await?;

        if let Some(default_id) = default_transition(data) {
            info!("Setting default audit log of {} to {:?}", log.organization_id, default_id);
            client.set_default_audit_log(&log.organization_id, default_id).await?;
        }
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.audit().delete_audit_log(data.id()).await
    }

    fn customize_diff(&self, data: &ResourceData) -> Result<()> {
        ensure_unchanged(data, "organization")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    fn view() -> ResourceData {
        ResourceData::new(attrs! {
            "name" => "test-name",
            "description" => "test-description",
            "organization" => "org-1",
            "is_default" => true,
        })
    }

    #[test]
    fn test_round_trip() {
        let data = view();
        let log = expand_audit_log(&data).unwrap();
        assert_eq!(log.destinations.len(), 1);
        assert_eq!(log.destinations[0].kind, "cloud");
        let flattened = flatten_audit_log(&log);
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_required_attributes() {
        for required in ["name", "organization"] {
            let mut data = view();
            data.state_mut().remove(required);
            let err = expand_audit_log(&data).unwrap_err();
            assert!(matches!(err, ProviderError::Malformed { ref attribute, .. } if attribute == required));
        }
    }

    #[test]
    fn test_default_transitions() {
        let on = ResourceData::with_prior(
            "log-1",
            attrs! { "is_default" => false },
            attrs! { "is_default" => true },
        );
        assert_eq!(default_transition(&on), Some("log-1"));

        let off = ResourceData::with_prior(
            "log-1",
            attrs! { "is_default" => true },
            attrs! { "is_default" => false },
        );
        assert_eq!(default_transition(&off), Some(""));

        let same = ResourceData::with_prior(
            "log-1",
            attrs! { "is_default" => true },
            attrs! { "is_default" => true },
        );
        assert_eq!(default_transition(&same), None);
    }

    #[test]
    fn test_changed_organization_is_rejected() {
        let data = ResourceData::with_prior(
            "log-1",
            attrs! { "name" => "n", "organization" => "org-1" },
            attrs! { "name" => "n", "organization" => "org-2" },
        );
        let err = AuditLogResource.customize_diff(&data).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
    }
}
