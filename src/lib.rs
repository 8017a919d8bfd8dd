//! Oasis infrastructure provider
//!
//! Reconciles declarative resource definitions against the Oasis
//! managed-database cloud. The host drives every instance through
//! create/read/update/delete/import calls served by [`plugin::serve`].
//!
//! # Layout
//!
//! - [`oasis`] - Authenticated REST client and per-service stubs
//! - [`schema`] - Attribute trees, schemas, validation and plan-time diff
//! - [`resource`] - Controller traits, registry, session and dispatcher
//! - [`resources`] - One controller per managed kind
//! - [`data_sources`] - Read-only lookups
//! - [`plugin`] - Newline-delimited JSON host protocol

pub mod config;
pub mod data_sources;
pub mod error;
pub mod helpers;
pub mod oasis;
pub mod plugin;
pub mod resource;
pub mod resources;
pub mod schema;

/// Crate version reported to the host
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
