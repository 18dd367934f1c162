//! Resolved operation parameters and the summary returned to callers.

use serde::Serialize;

use crate::catalog::{PackageManagerFormat, ProxyEndpoint};
use crate::config::SystemConfig;

use super::Action;

/// Fully validated parameters for one create or delete invocation.
///
/// Built once per request by [`crate::validation::RequestValidator`] and
/// passed by reference to the privilege manager. Nothing here is persisted.
#[derive(Debug)]
pub struct OperationConfig {
    pub action: Action,
    pub system: SystemConfig,
    pub ldap_username: String,
    pub organization_id: String,
    pub remote_url: String,
    pub extra_roles: Vec<String>,
    pub repository_name: String,
    pub privilege_name: String,
    pub role_name: String,
    pub package_manager: String,
    pub format: PackageManagerFormat,
    pub proxy_endpoint: ProxyEndpoint,
    pub shared: bool,
    pub app_id: Option<String>,
}

/// Response payload describing what an operation targeted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationSummary {
    pub action: Action,
    pub repository_name: String,
    pub privilege_name: String,
    pub role_name: String,
    pub ldap_username: String,
    pub organization_id: String,
    pub package_manager: String,
    pub shared: bool,
    pub app_id: Option<String>,
}

impl From<&OperationConfig> for OperationSummary {
    fn from(config: &OperationConfig) -> Self {
        Self {
            action: config.action,
            repository_name: config.repository_name.clone(),
            privilege_name: config.privilege_name.clone(),
            role_name: config.role_name.clone(),
            ldap_username: config.ldap_username.clone(),
            organization_id: config.organization_id.clone(),
            package_manager: config.package_manager.clone(),
            shared: config.shared,
            app_id: if config.shared {
                None
            } else {
                config.app_id.clone()
            },
        }
    }
}
