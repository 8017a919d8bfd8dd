//! Resource Registry - every resource and data-source kind the provider serves
//!
//! Controllers are built once on first access and shared by every request.

use super::{DataSource, Resource};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Kind name to controller
pub struct Registry {
    pub resources: HashMap<&'static str, Box<dyn Resource>>,
    pub data_sources: HashMap<&'static str, Box<dyn DataSource>>,
}

/// Global registry
static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Get the registry (builds every controller on first access)
pub fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let resources = crate::resources::all()
            .into_iter()
            .map(|r| (r.kind(), r))
            .collect();
        let data_sources = crate::data_sources::all()
            .into_iter()
            .map(|d| (d.kind(), d))
            .collect();
        Registry {
            resources,
            data_sources,
        }
    })
}

/// Get a resource controller by kind
pub fn get_resource(kind: &str) -> Option<&'static dyn Resource> {
    get_registry().resources.get(kind).map(|r| r.as_ref())
}

/// Get a data-source controller by kind
pub fn get_data_source(kind: &str) -> Option<&'static dyn DataSource> {
    get_registry().data_sources.get(kind).map(|d| d.as_ref())
}

/// All resource kinds, sorted
pub fn get_all_resource_kinds() -> Vec<&'static str> {
    let mut kinds: Vec<_> = get_registry().resources.keys().copied().collect();
    kinds.sort_unstable();
    kinds
}

/// All data-source kinds, sorted
pub fn get_all_data_source_kinds() -> Vec<&'static str> {
    let mut kinds: Vec<_> = get_registry().data_sources.keys().copied().collect();
    kinds.sort_unstable();
    kinds
}
