//! Inbound repository request payload.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/repository` and `DELETE /api/repository`.
///
/// Every field is optional at the serde level so that validation can report
/// all missing fields together instead of failing on the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRequest {
    #[serde(default)]
    pub organization_name_chinese: Option<String>,
    #[serde(default)]
    pub ldap_username: Option<String>,
    #[serde(default)]
    pub package_manager: Option<String>,
    #[serde(default)]
    pub shared: Option<bool>,
    #[serde(default)]
    pub app_id: Option<String>,
}

impl RepositoryRequest {
    /// Whether the repository is shared across the organization. Defaults to false.
    pub fn is_shared(&self) -> bool {
        self.shared.unwrap_or(false)
    }
}

/// Returns the trimmed value, or `None` when absent or blank.
pub(crate) fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
