//! Nexus Manager Core Library
//!
//! Catalogs, settings, request validation and the Nexus / IQ Server
//! provisioning logic behind the nexus-manager HTTP service.

pub mod catalog;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod naming;
pub mod remote;
pub mod validation;

pub use error::{ManagerError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
