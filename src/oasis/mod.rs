//! Oasis API interaction module
//!
//! This module provides the transport the controllers consume: API-key
//! authentication, an HTTP client, cancellation and one typed stub per
//! remote service.
//!
//! # Module Structure
//!
//! - [`auth`] - API key authentication
//! - [`client`] - Main Oasis client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//! - [`cancel`] - Cancellation observed at remote-call boundaries
//! - One module per service: [`iam`], [`resourcemanager`], [`data`],
//!   [`backup`], [`crypto`], [`security`], [`audit`], [`network`],
//!   [`notebook`], [`example`], [`platform`]
//!
//! # Example
//!
//! ```ignore
//! use oasis_provider::oasis::client::OasisClient;
//!
//! async fn example(client: &OasisClient) -> oasis_provider::error::Result<()> {
//!     let backup = client.backup().get_backup("my-backup").await?;
//!     println!("{}", backup.name);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cancel;
pub mod client;
pub mod duration;
pub mod http;

pub mod audit;
pub mod backup;
pub mod crypto;
pub mod data;
pub mod example;
pub mod iam;
pub mod network;
pub mod notebook;
pub mod platform;
pub mod resourcemanager;
pub mod security;
