//! Request validation and resolution into an [`OperationConfig`].

use crate::catalog::Catalog;
use crate::config::{Settings, SystemConfig};
use crate::error::{ManagerError, Result};
use crate::models::request::trimmed;
use crate::models::{Action, OperationConfig, RepositoryRequest};
use crate::naming::ResourceNames;

/// Validates requests against the catalogs and honoured settings.
///
/// Caller errors (missing fields, the shared/app_id rule, unknown
/// organization or package manager) are checked before operator settings, so
/// a bad request is always reported as such and never reaches Nexus.
pub struct RequestValidator<'a> {
    catalog: &'a Catalog,
    settings: &'a Settings,
}

impl<'a> RequestValidator<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a Settings) -> Self {
        Self { catalog, settings }
    }

    /// Resolves `request` into the parameters for `action`.
    pub fn resolve(&self, action: Action, request: &RepositoryRequest) -> Result<OperationConfig> {
        let organization_name = trimmed(&request.organization_name_chinese);
        let ldap_username = trimmed(&request.ldap_username);
        let package_manager = trimmed(&request.package_manager);

        let missing: Vec<&str> = [
            ("organization_name_chinese", organization_name),
            ("ldap_username", ldap_username),
            ("package_manager", package_manager),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| *field)
        .collect();

        let (Some(organization_name), Some(ldap_username), Some(package_manager)) =
            (organization_name, ldap_username, package_manager)
        else {
            return Err(ManagerError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let shared = request.is_shared();
        let app_id = trimmed(&request.app_id);
        if !shared && app_id.is_none() {
            return Err(ManagerError::Validation(
                "app_id is required for non-shared repositories".to_string(),
            ));
        }

        let organization = self
            .catalog
            .find_organization(organization_name)
            .ok_or_else(|| {
                ManagerError::NotFound(format!(
                    "Organization with Chinese name '{}' not found.",
                    organization_name
                ))
            })?;

        let format = self
            .catalog
            .format(package_manager)
            .filter(|f| f.proxy_url().is_some())
            .ok_or_else(|| {
                ManagerError::NotFound(format!(
                    "No default URL configured for package manager: {}",
                    package_manager
                ))
            })?;

        let system = SystemConfig::from_settings(self.settings)?;

        let app_id = if shared { None } else { app_id };
        let names = ResourceNames::derive(package_manager, shared, app_id, ldap_username);

        Ok(OperationConfig {
            action,
            system,
            ldap_username: ldap_username.to_string(),
            organization_id: organization.id.clone(),
            remote_url: format.default_url.clone(),
            extra_roles: self.settings.extra_roles(),
            repository_name: names.repository,
            privilege_name: names.privilege,
            role_name: names.role,
            package_manager: package_manager.to_string(),
            proxy_endpoint: self.catalog.proxy_endpoint(format),
            format: format.clone(),
            shared,
            app_id: app_id.map(str::to_string),
        })
    }
}
