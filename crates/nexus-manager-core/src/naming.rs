//! Deterministic resource naming.
//!
//! Names depend only on the package manager, the sharing flag and the app id,
//! so a delete request with the same inputs targets exactly what create made.

/// Suffix used in place of an app id for organization-wide repositories.
pub const SHARED_SUFFIX: &str = "shared";

/// Names of the three Nexus objects managed for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub repository: String,
    pub privilege: String,
    pub role: String,
}

impl ResourceNames {
    /// Derives all names for a request. `app_id` is ignored when `shared` is set.
    pub fn derive(package_manager: &str, shared: bool, app_id: Option<&str>, ldap_username: &str) -> Self {
        let repository = repository_name(package_manager, shared, app_id);
        Self {
            privilege: repository.clone(),
            repository,
            role: ldap_username.to_string(),
        }
    }
}

/// `{package_manager}-release-{shared|app_id}`, lowercased.
pub fn repository_name(package_manager: &str, shared: bool, app_id: Option<&str>) -> String {
    let scope = if shared {
        SHARED_SUFFIX
    } else {
        app_id.unwrap_or_default()
    };
    format!("{}-release-{}", package_manager, scope).to_lowercase()
}
