//! Dispatcher - routes host operations to controllers
//!
//! Lifecycle rules shared by every kind live here rather than in the
//! controllers:
//!
//! - Validation and schema defaults run before any remote call
//! - A session is connected per invocation; any failure to connect is a
//!   configuration error
//! - Create and update are followed by a read of the remote object
//! - Read dropping a vanished object is not an error
//! - Create failure and successful delete clear the id

use super::{get_all_data_source_kinds, get_all_resource_kinds, get_data_source, get_resource};
use super::{Resource, Session};
use crate::config::ProviderConfig;
use crate::error::{Diagnostic, ProviderError, Result};
use crate::oasis::cancel::CancelSignal;
use crate::schema::{apply_defaults, plan, validate, AttributeMap, ResourceData, Schema};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of one host operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AttributeMap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires_replace: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn failed(err: ProviderError) -> Self {
        Self::diagnostics(vec![err.into()])
    }

    fn diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Default::default()
        }
    }

    /// State of `data`; a cleared id drops the state too
    fn from_data(data: ResourceData, diagnostics: Vec<Diagnostic>) -> Self {
        if !data.has_id() {
            return Self::diagnostics(diagnostics);
        }
        let id = data.id().to_string();
        Self {
            id: Some(id),
            state: Some(data.into_state()),
            requires_replace: Vec::new(),
            diagnostics,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Provider instance serving one host
pub struct Provider {
    config: OnceLock<ProviderConfig>,
    stop: watch::Sender<bool>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            config: OnceLock::new(),
            stop,
        }
    }

    /// Provider configuration, resources and data sources
    pub fn schema_manifest(&self) -> Value {
        let resources: Map<String, Value> = get_all_resource_kinds()
            .into_iter()
            .filter_map(|kind| get_resource(kind).map(|r| (kind.to_string(), r.schema().describe())))
            .collect();
        let data_sources: Map<String, Value> = get_all_data_source_kinds()
            .into_iter()
            .filter_map(|kind| get_data_source(kind).map(|d| (kind.to_string(), d.schema().describe())))
            .collect();
        json!({
            "provider": ProviderConfig::schema().describe(),
            "resources": resources,
            "data_sources": data_sources,
        })
    }

    pub fn configure(&self, values: AttributeMap) -> Outcome {
        let mut values = values;
        if let Err(diagnostics) = prepare(&ProviderConfig::schema(), &mut values) {
            return Outcome::diagnostics(diagnostics);
        }
        let config = match ProviderConfig::from_attributes(&values) {
            Ok(config) => config,
            Err(err) => return Outcome::failed(err),
        };
        info!("Configuring provider: {:?}", config);
        match self.config.set(config) {
            Ok(()) => Outcome::default(),
            Err(_) => Outcome::failed(ProviderError::Config("provider is already configured".into())),
        }
    }

    /// Cancel every in-flight and future operation
    pub fn stop(&self) {
        info!("Stop requested; cancelling in-flight operations");
        self.stop.send_replace(true);
    }

    pub fn validate_resource(&self, kind: &str, values: AttributeMap) -> Outcome {
        let resource = match lookup_resource(kind) {
            Ok(resource) => resource,
            Err(err) => return Outcome::failed(err),
        };
        let mut values = values;
        match prepare(&resource.schema(), &mut values) {
            Ok(()) => Outcome::default(),
            Err(diagnostics) => Outcome::diagnostics(diagnostics),
        }
    }

    /// Planned state for `proposed`, plus the attributes forcing replacement
    pub fn plan_resource(
        &self,
        kind: &str,
        prior: Option<(String, AttributeMap)>,
        proposed: AttributeMap,
    ) -> Outcome {
        let resource = match lookup_resource(kind) {
            Ok(resource) => resource,
            Err(err) => return Outcome::failed(err),
        };
        let schema = resource.schema();
        let mut proposed = proposed;
        if let Err(diagnostics) = prepare(&schema, &mut proposed) {
            return Outcome::diagnostics(diagnostics);
        }

        let result = plan(&schema, prior.as_ref().map(|(_, state)| state), &proposed);
        let data = match prior {
            Some((id, state)) => ResourceData::with_prior(id, state, result.planned_state.clone()),
            None => ResourceData::new(result.planned_state.clone()),
        };
        if let Err(err) = resource.customize_diff(&data) {
            return Outcome::failed(err);
        }

        debug!("Planned {} (replace: {:?})", kind, result.requires_replace);
        Outcome {
            id: data.has_id().then(|| data.id().to_string()),
            state: Some(result.planned_state),
            requires_replace: result.requires_replace,
            diagnostics: Vec::new(),
        }
    }

    pub async fn create(&self, kind: &str, planned: AttributeMap) -> Outcome {
        let resource = match lookup_resource(kind) {
            Ok(resource) => resource,
            Err(err) => return Outcome::failed(err),
        };
        let mut planned = planned;
        if let Err(diagnostics) = prepare(&resource.schema(), &mut planned) {
            return Outcome::diagnostics(diagnostics);
        }
        let session = match self.session().await {
            Ok(session) => session,
            Err(err) => return Outcome::failed(err),
        };

        let mut data = ResourceData::new(planned);
        info!("Creating {}", kind);
        if let Err(err) = resource.create(&session, &mut data).await {
            warn!("Create of {} failed: {}", kind, err);
            data.clear_id();
            return Outcome::from_data(data, vec![err.into()]);
        }
        info!("Created {} {}", kind, data.id());
        let diagnostics = refresh(resource, &session, &mut data).await;
        Outcome::from_data(data, diagnostics)
    }

    pub async fn read(&self, kind: &str, id: &str, state: AttributeMap) -> Outcome {
        let resource = match lookup_resource(kind) {
            Ok(resource) => resource,
            Err(err) => return Outcome::failed(err),
        };
        let session = match self.session().await {
            Ok(session) => session,
            Err(err) => return Outcome::failed(err),
        };
        let mut data = ResourceData::existing(id, state);
        let diagnostics = refresh(resource, &session, &mut data).await;
        Outcome::from_data(data, diagnostics)
    }

    pub async fn update(&self, kind: &str, id: &str, prior: AttributeMap, planned: AttributeMap) -> Outcome {
        let resource = match lookup_resource(kind) {
            Ok(resource) => resource,
            Err(err) => return Outcome::failed(err),
        };
        let schema = resource.schema();
        let mut planned = planned;
        if let Err(diagnostics) = prepare(&schema, &mut planned) {
            return Outcome::diagnostics(diagnostics);
        }

        let replace = plan(&schema, Some(&prior), &planned).requires_replace;
        if !replace.is_empty() {
            return Outcome::failed(ProviderError::invalid(format!(
                "{kind} {id}: changes to {} require replacement",
                replace.join(", ")
            )));
        }
        let mut data = ResourceData::with_prior(id, prior, planned);
        if let Err(err) = resource.customize_diff(&data) {
            return Outcome::failed(err);
        }
        let session = match self.session().await {
            Ok(session) => session,
            Err(err) => return Outcome::failed(err),
        };

        info!("Updating {} {}", kind, id);
        if let Err(err) = resource.update(&session, &mut data).await {
            warn!("Update of {} {} failed: {}", kind, id, err);
            return Outcome::from_data(data, vec![err.into()]);
        }
        let diagnostics = refresh(resource, &session, &mut data).await;
        Outcome::from_data(data, diagnostics)
    }

    pub async fn delete(&self, kind: &str, id: &str, state: AttributeMap) -> Outcome {
        let resource = match lookup_resource(kind) {
            Ok(resource) => resource,
            Err(err) => return Outcome::failed(err),
        };
        let session = match self.session().await {
            Ok(session) => session,
            Err(err) => return Outcome::failed(err),
        };
        let mut data = ResourceData::existing(id, state);
        info!("Deleting {} {}", kind, id);
        match resource.delete(&session, &mut data).await {
            Ok(()) => {
                data.clear_id();
                Outcome::default()
            }
            Err(err) => {
                warn!("Delete of {} {} failed: {}", kind, id, err);
                Outcome::from_data(data, vec![err.into()])
            }
        }
    }

    pub async fn import(&self, kind: &str, id: &str) -> Outcome {
        let resource = match lookup_resource(kind) {
            Ok(resource) => resource,
            Err(err) => return Outcome::failed(err),
        };
        let session = match self.session().await {
            Ok(session) => session,
            Err(err) => return Outcome::failed(err),
        };
        let mut data = ResourceData::existing(id, AttributeMap::new());
        info!("Importing {} {}", kind, id);
        match resource.import(&session, &mut data).await {
            Ok(()) if data.has_id() => Outcome::from_data(data, Vec::new()),
            Ok(()) => Outcome::failed(ProviderError::NotFound(format!(
                "cannot import non-existent remote object {id}"
            ))),
            Err(err) => Outcome::failed(err),
        }
    }

    pub async fn read_data_source(&self, kind: &str, values: AttributeMap) -> Outcome {
        let Some(source) = get_data_source(kind) else {
            return Outcome::failed(ProviderError::invalid(format!("unknown data source {kind}")));
        };
        let mut values = values;
        if let Err(diagnostics) = prepare(&source.schema(), &mut values) {
            return Outcome::diagnostics(diagnostics);
        }
        let session = match self.session().await {
            Ok(session) => session,
            Err(err) => return Outcome::failed(err),
        };
        let mut data = ResourceData::new(values);
        debug!("Reading data source {}", kind);
        match source.read(&session, &mut data).await {
            Ok(()) => Outcome::from_data(data, Vec::new()),
            Err(err) => Outcome::failed(err),
        }
    }

    /// Connect a fresh session for one invocation
    async fn session(&self) -> Result<Session> {
        let config = self
            .config
            .get()
            .ok_or_else(|| ProviderError::Config("provider is not configured".into()))?;
        Session::connect(config, CancelSignal::subscribe(&self.stop))
            .await
            .map_err(|err| match err {
                ProviderError::Cancelled | ProviderError::Config(_) => err,
                other => ProviderError::Config(format!("failed to connect to the API: {other}")),
            })
    }
}

fn lookup_resource(kind: &str) -> Result<&'static dyn Resource> {
    get_resource(kind).ok_or_else(|| ProviderError::invalid(format!("unknown resource kind {kind}")))
}

/// Apply schema defaults, then validate
fn prepare(schema: &Schema, values: &mut AttributeMap) -> std::result::Result<(), Vec<Diagnostic>> {
    apply_defaults(schema, values);
    let errors = validate(schema, values);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into_iter().map(Diagnostic::from).collect())
    }
}

/// Read after write, or a plain refresh
async fn refresh(resource: &dyn Resource, session: &Session, data: &mut ResourceData) -> Vec<Diagnostic> {
    match resource.read(session, data).await {
        Ok(()) => Vec::new(),
        Err(err) if err.is_not_found() => {
            warn!("{} {} no longer exists; dropping it", resource.kind(), data.id());
            data.clear_id();
            Vec::new()
        }
        Err(err) => vec![err.into()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;

    #[test]
    fn test_manifest_lists_every_kind() {
        let manifest = Provider::new().schema_manifest();
        assert!(manifest["provider"]["api_key_secret"]["sensitive"].as_bool().unwrap());
        assert!(manifest["resources"]["oasis_backup_policy"].is_object());
        assert!(manifest["data_sources"]["oasis_organizations"].is_object());
    }

    #[test]
    fn test_configure_twice_is_rejected() {
        let provider = Provider::new();
        assert!(!provider.configure(attrs! { "organization" => "org-1" }).has_errors());
        let second = provider.configure(attrs! {});
        assert!(second.has_errors());
    }

    #[test]
    fn test_validate_reports_missing_required() {
        let outcome = Provider::new().validate_resource("oasis_project", attrs! {});
        assert!(outcome.has_errors());
        assert_eq!(outcome.diagnostics[0].attribute.as_deref(), Some("name"));
    }

    #[test]
    fn test_plan_reports_force_new() {
        let outcome = Provider::new().plan_resource(
            "oasis_example_dataset_installation",
            Some((
                "inst-1".into(),
                attrs! { "id" => "inst-1", "deployment_id" => "dep-1", "example_dataset_id" => "ds-1" },
            )),
            attrs! { "deployment_id" => "dep-2", "example_dataset_id" => "ds-1" },
        );
        assert!(!outcome.has_errors());
        assert_eq!(outcome.requires_replace, vec!["deployment_id".to_string()]);
    }

    #[test]
    fn test_plan_rejects_changed_audit_log_organization() {
        let prior = attrs! { "id" => "log-1", "name" => "log", "organization" => "org-1" };
        let outcome = Provider::new().plan_resource(
            "oasis_auditlog",
            Some(("log-1".into(), prior)),
            attrs! { "name" => "log", "organization" => "org-2" },
        );
        assert!(outcome.has_errors());
        assert!(outcome.diagnostics[0].detail.contains("organization"));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_reports_config_error() {
        let outcome = Provider::new().read("oasis_project", "p-1", attrs! {}).await;
        assert!(outcome.has_errors());
        assert_eq!(outcome.diagnostics[0].summary, "Provider configuration error");
    }

    #[tokio::test]
    async fn test_update_refuses_force_new_change() {
        let provider = Provider::new();
        let prior = attrs! { "id" => "inv-1", "organization" => "org-1", "email" => "a@b.io" };
        let outcome = provider
            .update(
                "oasis_organization_invite",
                "inv-1",
                prior,
                attrs! { "organization" => "org-1", "email" => "c@d.io" },
            )
            .await;
        assert!(outcome.has_errors());
        assert!(outcome.diagnostics[0].detail.contains("require replacement"));
    }
}
