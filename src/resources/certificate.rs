//! CA certificate resource

use super::set_present;
use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::timestamp_value;
use crate::oasis::crypto::CaCertificate;
use crate::resource::session::pick;
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::{Attribute, AttributeMap, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;
use std::time::Duration;

pub struct CertificateResource;

/// Written on every read; other attributes only when already present
const READ_ONLY: &[&str] = &["is_default", "created_at", "expires_at"];

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("project", Attribute::string().optional().computed().force_new())
        .attr(
            "lifetime",
            Attribute::int()
                .optional()
                .force_new()
                .describe("Lifetime of the certificate in seconds"),
        )
        .attr("use_well_known_certificate", Attribute::bool().optional())
        .attr("locked", Attribute::bool().optional())
        // The service picks the project default; it is reported, never set
        .attr("is_default", Attribute::bool().computed())
        .attr("created_at", Attribute::string().computed())
        .attr("expires_at", Attribute::string().computed())
}

pub fn expand_certificate(data: &ResourceData, default_project: &str) -> Result<CaCertificate> {
    let project_id = pick(data.get_str("project"), default_project);
    if project_id.is_empty() {
        return Err(ProviderError::missing("project"));
    }
    let lifetime = match data.get_ok("lifetime").and_then(AttributeValue::as_int) {
        Some(secs) if secs < 0 => {
            return Err(ProviderError::malformed("lifetime", "lifetime cannot be negative"))
        }
        Some(secs) => Some(Duration::from_secs(secs.unsigned_abs())),
        None => None,
    };
    Ok(CaCertificate {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        project_id,
        lifetime,
        use_well_known_certificate: data.get_bool("use_well_known_certificate"),
        locked: data.get_bool("locked"),
        ..Default::default()
    })
}

pub fn flatten_certificate(cert: &CaCertificate) -> AttributeMap {
    attrs! {
        "name" => &cert.name,
        "description" => &cert.description,
        "project" => &cert.project_id,
        "lifetime" => cert.lifetime.map(|d| d.as_secs() as i64).unwrap_or(0),
        "use_well_known_certificate" => cert.use_well_known_certificate,
        "locked" => cert.locked,
        "is_default" => cert.is_default,
        "created_at" => timestamp_value(cert.created_at.as_ref()),
        "expires_at" => timestamp_value(cert.expires_at.as_ref()),
    }
}

#[async_trait]
impl Resource for CertificateResource {
    fn kind(&self) -> &'static str {
        "oasis_certificate"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let cert = expand_certificate(data, session.default_project())?;
        let created = session.crypto().create_ca_certificate(&cert).await?;
        data.set_id(&created.id);
        if data.get_ok("project").is_none() {
            data.set("project", &created.project_id);
        }
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let cert = session.crypto().get_ca_certificate(data.id()).await?;
        set_present(data, flatten_certificate(&cert), READ_ONLY);
        Ok(())
    }

    async fn import(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let cert = session.crypto().get_ca_certificate(data.id()).await?;
        data.set_all(flatten_certificate(&cert));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let client = session.crypto();
        let id = data.id().to_string();
        let mut cert = fetch_for_update(data, client.get_ca_certificate(&id)).await?;

        if data.has_change("name") {
            cert.name = data.require_str("name")?.to_string();
        }
        if data.has_change("description") {
            cert.description = data.get_string("description");
        }
        if data.has_change("use_well_known_certificate") {
            cert.use_well_known_certificate = data.get_bool("use_well_known_certificate");
        }
        if data.has_change("locked") {
            cert.locked = data.get_bool("locked");
        }
        client.update_ca_certificate(&cert).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.crypto().delete_ca_certificate(data.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;

    fn view() -> ResourceData {
        ResourceData::new(attrs! {
            "name" => "test-name",
            "description" => "test-description",
            "project" => "123456789",
            "use_well_known_certificate" => true,
            "lifetime" => 3600,
            "locked" => true,
        })
    }

    #[test]
    fn test_expand_certificate() {
        let cert = expand_certificate(&view(), "").unwrap();
        let expected = CaCertificate {
            name: "test-name".into(),
            description: "test-description".into(),
            project_id: "123456789".into(),
            use_well_known_certificate: true,
            lifetime: Some(Duration::from_secs(3600)),
            locked: true,
            ..Default::default()
        };
        assert_eq!(cert, expected);
    }

    #[test]
    fn test_round_trip() {
        let data = view();
        let flattened = flatten_certificate(&expand_certificate(&data, "").unwrap());
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_project_defaults_to_session() {
        let mut data = view();
        data.state_mut().remove("project");
        assert_eq!(expand_certificate(&data, "proj-default").unwrap().project_id, "proj-default");
    }

    #[test]
    fn test_is_default_is_never_sent() {
        assert!(schema().get("is_default").unwrap().is_read_only());
        let mut data = view();
        data.set("is_default", true);
        assert!(!expand_certificate(&data, "").unwrap().is_default);
    }

    #[test]
    fn test_missing_name() {
        let mut data = view();
        data.state_mut().remove("name");
        assert!(expand_certificate(&data, "").unwrap_err().to_string().contains("name"));
        assert_eq!(validate(&schema(), data.state()).len(), 1);
    }

    #[test]
    fn test_read_only_writes_present_keys() {
        let mut data = ResourceData::existing("cert-1", attrs! { "name" => "mine" });
        let remote = CaCertificate {
            id: "cert-1".into(),
            name: "mine".into(),
            description: "server side".into(),
            lifetime: Some(Duration::from_secs(7200)),
            is_default: true,
            ..Default::default()
        };
        set_present(&mut data, flatten_certificate(&remote), READ_ONLY);
        assert!(data.get("description").is_none());
        assert!(data.get("lifetime").is_none());
        assert!(data.get_bool("is_default"));
        assert_eq!(data.get_str("created_at"), Some(""));
    }
}
