//! Per-invocation session

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::oasis::audit::AuditClient;
use crate::oasis::backup::BackupClient;
use crate::oasis::cancel::CancelSignal;
use crate::oasis::client::OasisClient;
use crate::oasis::crypto::CryptoClient;
use crate::oasis::data::DataClient;
use crate::oasis::example::ExampleClient;
use crate::oasis::iam::IamClient;
use crate::oasis::network::NetworkClient;
use crate::oasis::notebook::NotebookClient;
use crate::oasis::platform::PlatformClient;
use crate::oasis::resourcemanager::ResourceManagerClient;
use crate::oasis::security::SecurityClient;

/// Connected, authenticated handle plus the inherited defaults
///
/// One session is created for every controller invocation and dropped
/// when the invocation returns.
#[derive(Clone)]
pub struct Session {
    client: OasisClient,
    default_organization: String,
    default_project: String,
}

impl Session {
    /// Authenticate with the configured credentials
    pub async fn connect(config: &ProviderConfig, cancel: CancelSignal) -> Result<Self> {
        let credentials = config.credentials()?;
        let endpoint = config.endpoint();
        tracing::debug!("Connecting to {} with key {}", endpoint, credentials.key_id());
        let client = OasisClient::connect(&endpoint, &credentials, cancel).await?;
        Ok(Self::new(
            client,
            &config.effective_organization(),
            &config.effective_project(),
        ))
    }

    pub fn new(client: OasisClient, default_organization: &str, default_project: &str) -> Self {
        Self {
            client,
            default_organization: default_organization.to_string(),
            default_project: default_project.to_string(),
        }
    }

    pub fn default_organization(&self) -> &str {
        &self.default_organization
    }

    pub fn default_project(&self) -> &str {
        &self.default_project
    }

    /// `explicit` unless unset or empty, else the session default
    pub fn organization_or(&self, explicit: Option<&str>) -> String {
        pick(explicit, &self.default_organization)
    }

    pub fn iam(&self) -> IamClient<'_> {
        self.client.iam()
    }

    pub fn resource_manager(&self) -> ResourceManagerClient<'_> {
        self.client.resource_manager()
    }

    pub fn data(&self) -> DataClient<'_> {
        self.client.data()
    }

    pub fn backup(&self) -> BackupClient<'_> {
        self.client.backup()
    }

    pub fn crypto(&self) -> CryptoClient<'_> {
        self.client.crypto()
    }

    pub fn security(&self) -> SecurityClient<'_> {
        self.client.security()
    }

    pub fn audit(&self) -> AuditClient<'_> {
        self.client.audit()
    }

    pub fn network(&self) -> NetworkClient<'_> {
        self.client.network()
    }

    pub fn notebook(&self) -> NotebookClient<'_> {
        self.client.notebook()
    }

    pub fn example(&self) -> ExampleClient<'_> {
        self.client.example()
    }

    pub fn platform(&self) -> PlatformClient<'_> {
        self.client.platform()
    }
}

/// Default-inheritance rule shared by every expand function
pub fn pick(explicit: Option<&str>, default: &str) -> String {
    explicit
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
