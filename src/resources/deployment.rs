//! Deployment resource
//!
//! Create fills in what the configuration leaves open from the service:
//! the default database version, the project's default CA certificate,
//! the first node size offered for the region and model, and the current
//! terms and conditions of the owning organization.

use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::{email_validator, expand_int32, expand_string_list, timestamp_value};
use crate::oasis::data::{
    CertificateSpec, Deployment, DiskAutoSizeSettings, ModelSpec, NotificationSettings,
};
use crate::resource::session::pick;
use crate::resource::{fetch_for_update, Resource, Session};
use crate::schema::data::BlockExt;
use crate::schema::{Attribute, AttributeMap, AttributeType, AttributeValue, ResourceData, Schema};
use crate::one_of;
use async_trait::async_trait;
use tracing::debug;

pub struct DeploymentResource;

/// Model used when the configuration block leaves it unset
pub const DEFAULT_MODEL: &str = "oneshard";
/// Node count used when the configuration block leaves it unset
pub const DEFAULT_NODE_COUNT: i64 = 3;

fn location_schema() -> Schema {
    Schema::nested().attr("region", Attribute::string().required().describe("Region id"))
}

fn version_schema() -> Schema {
    Schema::nested().attr("db_version", Attribute::string().optional().computed())
}

fn security_schema() -> Schema {
    Schema::nested()
        .attr("ca_certificate", Attribute::string().optional().computed())
        .attr("ip_allowlist", Attribute::string().optional())
        .attr("disable_foxx_authentication", Attribute::bool().optional())
}

fn configuration_schema() -> Schema {
    Schema::nested()
        .attr(
            "model",
            Attribute::string()
                .optional()
                .default_value(DEFAULT_MODEL)
                .validate(one_of!["oneshard", "sharded", "single", "flexible"]),
        )
        .attr("node_size_id", Attribute::string().optional().computed())
        .attr("node_count", Attribute::int().optional().default_value(DEFAULT_NODE_COUNT))
        .attr("node_disk_size", Attribute::int().optional().computed())
        .attr("maximum_node_disk_size", Attribute::int().optional())
}

fn notification_settings_schema() -> Schema {
    Schema::nested().attr(
        "email_addresses",
        Attribute::list_of(AttributeType::String)
            .optional()
            .validate(email_validator),
    )
}

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr("project", Attribute::string().optional().computed().force_new())
        .attr(
            "location",
            Attribute::single_block(location_schema()).required().force_new(),
        )
        .attr("version", Attribute::single_block(version_schema()).optional().computed())
        .attr("security", Attribute::single_block(security_schema()).optional().computed())
        .attr(
            "configuration",
            Attribute::single_block(configuration_schema()).required(),
        )
        .attr("disk_performance", Attribute::string().optional().computed())
        .attr(
            "terms_and_conditions_accepted",
            Attribute::bool()
                .optional()
                .default_value(false)
                .describe("Must be true to create a deployment"),
        )
        .attr(
            "notification_settings",
            Attribute::single_block(notification_settings_schema()).optional(),
        )
        .attr("locked", Attribute::bool().optional())
        .attr("deployment_profile_id", Attribute::string().optional())
        .attr(
            "disable_scheduled_root_password_rotation",
            Attribute::bool().optional().computed(),
        )
        .attr("url", Attribute::string().computed())
        .attr("endpoint", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
}

fn expand_model(block: &AttributeMap) -> Result<(ModelSpec, Option<DiskAutoSizeSettings>)> {
    let model = ModelSpec {
        model: match block.str_of("model") {
            "" => DEFAULT_MODEL.to_string(),
            m => m.to_string(),
        },
        node_size_id: block.str_of("node_size_id").to_string(),
        node_count: match block.int_of("node_count") {
            0 => expand_int32("configuration.0.node_count", DEFAULT_NODE_COUNT)?,
            n => expand_int32("configuration.0.node_count", n)?,
        },
        node_disk_size: expand_int32("configuration.0.node_disk_size", block.int_of("node_disk_size"))?,
    };
    let auto_size = match block.int_of("maximum_node_disk_size") {
        0 => None,
        max => Some(DiskAutoSizeSettings {
            maximum_node_disk_size: expand_int32("configuration.0.maximum_node_disk_size", max)?,
        }),
    };
    Ok((model, auto_size))
}

/// Deployment record from the view; `default_project` applies when
/// `project` is unset
pub fn expand_deployment(data: &ResourceData, default_project: &str) -> Result<Deployment> {
    let project_id = pick(data.get_str("project"), default_project);
    if project_id.is_empty() {
        return Err(ProviderError::missing("project"));
    }
    let region_id = data
        .get_block("location")
        .map(|b| b.str_of("region"))
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ProviderError::missing("location.0.region"))?
        .to_string();
    let (model, disk_auto_size_settings) = expand_model(data.require_block("configuration")?)?;

    let mut deployment = Deployment {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        project_id,
        region_id,
        model: Some(model),
        disk_auto_size_settings,
        disk_performance_id: data.get_string("disk_performance"),
        locked: data.get_bool("locked"),
        deployment_profile_id: data.get_string("deployment_profile_id"),
        ..Default::default()
    };
    if let Some(version) = data.get_block("version") {
        deployment.version = version.str_of("db_version").to_string();
    }
    if let Some(security) = data.get_block("security") {
        deployment.certificates = Some(CertificateSpec {
            ca_certificate_id: security.str_of("ca_certificate").to_string(),
        });
        deployment.ipallowlist_id = security.str_of("ip_allowlist").to_string();
        deployment.disable_foxx_authentication = security.bool_of("disable_foxx_authentication");
    }
    if let Some(settings) = data.get_block("notification_settings") {
        deployment.notification_settings = Some(NotificationSettings {
            email_addresses: expand_string_list(settings.list_of("email_addresses")),
        });
    }
    if let Some(disable) = data
        .get("disable_scheduled_root_password_rotation")
        .and_then(AttributeValue::as_bool)
    {
        deployment.is_scheduled_root_password_rotation_enabled = !disable;
    }
    Ok(deployment)
}

pub fn flatten_deployment(deployment: &Deployment) -> AttributeMap {
    let model = deployment.model.clone().unwrap_or_default();
    let maximum_node_disk_size = deployment
        .disk_auto_size_settings
        .as_ref()
        .map(|s| s.maximum_node_disk_size)
        .unwrap_or_default();
    let ca_certificate = deployment
        .certificates
        .as_ref()
        .map(|c| c.ca_certificate_id.clone())
        .unwrap_or_default();

    let mut values = attrs! {
        "name" => &deployment.name,
        "description" => &deployment.description,
        "project" => &deployment.project_id,
        "location" => AttributeValue::single_block(attrs! { "region" => &deployment.region_id }),
        "version" => AttributeValue::single_block(attrs! { "db_version" => &deployment.version }),
        "security" => AttributeValue::single_block(attrs! {
            "ca_certificate" => ca_certificate,
            "ip_allowlist" => &deployment.ipallowlist_id,
            "disable_foxx_authentication" => deployment.disable_foxx_authentication,
        }),
        "configuration" => AttributeValue::single_block(attrs! {
            "model" => model.model,
            "node_size_id" => model.node_size_id,
            "node_count" => model.node_count,
            "node_disk_size" => model.node_disk_size,
            "maximum_node_disk_size" => maximum_node_disk_size,
        }),
        "disk_performance" => &deployment.disk_performance_id,
        "locked" => deployment.locked,
        "deployment_profile_id" => &deployment.deployment_profile_id,
        "disable_scheduled_root_password_rotation" => !deployment.is_scheduled_root_password_rotation_enabled,
        "url" => &deployment.url,
        "endpoint" => deployment.status.as_ref().map(|s| s.endpoint.clone()).unwrap_or_default(),
        "created_at" => timestamp_value(deployment.created_at.as_ref()),
    };
    if let Some(settings) = &deployment.notification_settings {
        values.insert(
            "notification_settings".into(),
            AttributeValue::single_block(attrs! {
                "email_addresses" => settings.email_addresses.clone(),
            }),
        );
    }
    values
}

/// Fill the service-side defaults a new deployment needs
async fn resolve_defaults(session: &Session, deployment: &mut Deployment) -> Result<()> {
    let rm = session.resource_manager();
    let data = session.data();
    let crypto = session.crypto();

    let project = rm.get_project(&deployment.project_id).await?;
    let (terms, version, certificates) = futures::try_join!(
        rm.get_current_terms_and_conditions(&project.organization_id),
        async {
            if deployment.version.is_empty() {
                data.get_default_version().await.map(|v| Some(v.version))
            } else {
                Ok(None)
            }
        },
        crypto.list_ca_certificates(&deployment.project_id),
    )?;
    deployment.accepted_terms_and_conditions_id = terms.id;
    if let Some(version) = version {
        debug!("Using default version {}", version);
        deployment.version = version;
    }

    let certificate = deployment.certificates.get_or_insert_with(Default::default);
    if certificate.ca_certificate_id.is_empty() {
        let default = certificates.iter().find(|c| c.is_default).ok_or_else(|| {
            ProviderError::invalid(format!(
                "project {} has no default CA certificate",
                deployment.project_id
            ))
        })?;
        certificate.ca_certificate_id = default.id.clone();
    }

    let model = deployment.model.get_or_insert_with(Default::default);
    if model.node_size_id.is_empty() {
        let sizes = data
            .list_node_sizes(&deployment.project_id, &deployment.region_id, &model.model)
            .await?;
        let first = sizes.first().ok_or_else(|| {
            ProviderError::invalid(format!(
                "no node sizes available for model {} in region {}",
                model.model, deployment.region_id
            ))
        })?;
        model.node_size_id = first.id.clone();
        if model.node_disk_size == 0 {
            model.node_disk_size = first.min_disk_size;
        }
    }
    Ok(())
}

#[async_trait]
impl Resource for DeploymentResource {
    fn kind(&self) -> &'static str {
        "oasis_deployment"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let mut deployment = expand_deployment(data, session.default_project())?;
        if !data.get_bool("terms_and_conditions_accepted") {
            return Err(ProviderError::invalid(
                "terms_and_conditions_accepted must be true to create a deployment",
            ));
        }
        resolve_defaults(session, &mut deployment).await?;
        let created = session.data().create_deployment(&deployment).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let deployment = session.data().get_deployment(data.id()).await?;
        data.set_all(flatten_deployment(&deployment));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let client = session.data();
        let id = data.id().to_string();
        let mut current = fetch_for_update(data, client.get_deployment(&id)).await?;
        let desired = expand_deployment(data, session.default_project())?;

        if data.has_change("name") {
            current.name = desired.name;
        }
        if data.has_change("description") {
            current.description = desired.description;
        }
        if data.has_change("version") && !desired.version.is_empty() {
            current.version = desired.version;
        }
        if data.has_change("security") {
            if let Some(certificates) = desired.certificates.filter(|c| !c.ca_certificate_id.is_empty()) {
                current.certificates = Some(certificates);
            }
            current.ipallowlist_id = desired.ipallowlist_id;
            current.disable_foxx_authentication = desired.disable_foxx_authentication;
        }
        if data.has_change("configuration") {
            let mut model = desired.model.unwrap_or_default();
            let existing = current.model.clone().unwrap_or_default();
            if model.node_size_id.is_empty() {
                model.node_size_id = existing.node_size_id;
            }
            if model.node_disk_size == 0 {
                model.node_disk_size = existing.node_disk_size;
            }
            current.model = Some(model);
            current.disk_auto_size_settings = desired.disk_auto_size_settings;
        }
        if data.has_change("disk_performance") && !desired.disk_performance_id.is_empty() {
            current.disk_performance_id = desired.disk_performance_id;
        }
        if data.has_change("notification_settings") {
            current.notification_settings = desired.notification_settings;
        }
        if data.has_change("locked") {
            current.locked = desired.locked;
        }
        if data.has_change("deployment_profile_id") {
            current.deployment_profile_id = desired.deployment_profile_id;
        }
        if data.has_change("disable_scheduled_root_password_rotation") {
            current.is_scheduled_root_password_rotation_enabled =
                desired.is_scheduled_root_password_rotation_enabled;
        }
        client.update_deployment(&current).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.data().delete_deployment(data.id()).await
    }
}
