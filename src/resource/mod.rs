//! Resource abstraction layer
//!
//! Every managed kind is a [`Resource`] controller: a schema plus the
//! create/read/update/delete contract over a [`Session`] and a
//! [`ResourceData`] view. Read-only lookups are [`DataSource`]s.
//!
//! # Architecture
//!
//! - [`registry`] - Static table of every resource and data-source kind
//! - [`session`] - Authenticated per-invocation handle with inherited defaults
//! - [`dispatch`] - Routes host operations to controllers and enforces the
//!   lifecycle rules shared by all kinds
//!
//! # Example
//!
//! ```ignore
//! use oasis_provider::resource::{get_resource, Session};
//! use oasis_provider::schema::ResourceData;
//!
//! async fn refresh(session: &Session, data: &mut ResourceData) -> oasis_provider::error::Result<()> {
//!     let project = get_resource("oasis_project").unwrap();
//!     project.read(session, data).await
//! }
//! ```

pub mod dispatch;
mod registry;
pub mod session;

pub use dispatch::{Outcome, Provider};
pub use registry::*;
pub use session::Session;

use crate::error::{ProviderError, Result};
use crate::schema::{ResourceData, Schema};
use async_trait::async_trait;
use std::future::Future;

/// Controller for one managed resource kind
#[async_trait]
pub trait Resource: Send + Sync {
    /// Stable kind name, e.g. `oasis_project`
    fn kind(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Create the remote object and record its id
    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()>;

    /// Refresh `data` from the remote object
    ///
    /// Returning [`ProviderError::NotFound`] drops the instance.
    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()>;

    /// Push the attributes that changed
    async fn update(&self, _session: &Session, _data: &mut ResourceData) -> Result<()> {
        Err(ProviderError::invalid(format!(
            "{} does not support in-place updates",
            self.kind()
        )))
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()>;

    /// Adopt an existing remote object; `data` carries only the id
    async fn import(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        self.read(session, data).await
    }

    /// Plan-time check run after the generic diff
    fn customize_diff(&self, _data: &ResourceData) -> Result<()> {
        Ok(())
    }
}

/// Read-only lookup
#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Fill `data` with computed attributes and a stable id
    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()>;
}

/// Fetch the current remote object before an update
///
/// A failed fetch clears the id so the host re-plans the instance.
pub async fn fetch_for_update<T, F>(data: &mut ResourceData, fetch: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match fetch.await {
        Ok(record) => Ok(record),
        Err(err) => {
            tracing::warn!("Fetch before update of {} failed: {}", data.id(), err);
            data.clear_id();
            Err(err)
        }
    }
}

/// Reject a change to an attribute that is fixed after create
pub fn ensure_unchanged(data: &ResourceData, key: &str) -> Result<()> {
    if !data.is_new() && data.has_change(key) {
        return Err(ProviderError::invalid(format!(
            "{key} cannot be changed after creation (was {:?}, now {:?})",
            data.old(key).as_str().unwrap_or_default(),
            data.get_string(key)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;

    #[tokio::test]
    async fn test_fetch_for_update_clears_id_on_failure() {
        let mut data = ResourceData::existing("abc", attrs! { "name" => "x" });
        let result: Result<()> =
            fetch_for_update(&mut data, async { Err(ProviderError::NotFound("abc".into())) }).await;
        assert!(result.is_err());
        assert!(!data.has_id());
    }

    #[tokio::test]
    async fn test_fetch_for_update_keeps_id_on_success() {
        let mut data = ResourceData::existing("abc", attrs! {});
        let value = fetch_for_update(&mut data, async { Ok(5) }).await.unwrap();
        assert_eq!(value, 5);
        assert_eq!(data.id(), "abc");
    }

    #[test]
    fn test_ensure_unchanged() {
        let data = ResourceData::with_prior(
            "abc",
            attrs! { "organization" => "org-1" },
            attrs! { "organization" => "org-2" },
        );
        let err = ensure_unchanged(&data, "organization").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
        assert!(err.to_string().contains("organization"));

        let fresh = ResourceData::new(attrs! { "organization" => "org-2" });
        assert!(ensure_unchanged(&fresh, "organization").is_ok());
    }
}
