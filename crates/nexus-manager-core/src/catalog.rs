//! Static catalogs: organizations and package manager formats.
//!
//! Catalogs are read from JSON files in the configuration directory at startup
//! and never change afterwards. A missing file yields an empty catalog; a file
//! that exists but does not parse is a configuration error.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ManagerError, Result};

pub const ORGANIZATIONS_FILE: &str = "organisations.json";
pub const PACKAGE_MANAGER_FILE: &str = "package_manager_config.json";
pub const API_ENDPOINTS_FILE: &str = "nexus_api_endpoints.json";

/// An organization that may own repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub chinese_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
}

/// A repository format supported by Nexus and its upstream proxy target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManagerFormat {
    /// Filled from the catalog key.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub proxy_supported: bool,
    #[serde(default)]
    pub default_url: String,
    /// Path segment of the proxy creation endpoint, e.g. `maven` for `maven2`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Format recorded on repository-view privileges when it differs from the name.
    #[serde(default)]
    pub privilege_format: Option<String>,
    /// Format-specific attributes merged into the repository creation payload.
    #[serde(default)]
    pub default_config: Option<serde_json::Value>,
}

impl PackageManagerFormat {
    /// Returns the upstream URL if this format can be proxied.
    pub fn proxy_url(&self) -> Option<&str> {
        if self.proxy_supported && !self.default_url.is_empty() {
            Some(&self.default_url)
        } else {
            None
        }
    }

    pub fn privilege_format(&self) -> &str {
        self.privilege_format.as_deref().unwrap_or(&self.name)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(&self.name)
    }
}

/// Override for the proxy repository creation endpoint of one format.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProxyEndpoint {
    pub path: String,
    #[serde(default)]
    pub format_specific_config: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageManagerFile {
    #[serde(default)]
    supported_formats: BTreeMap<String, PackageManagerFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiEndpointsFile {
    #[serde(default)]
    proxy_repository_endpoints: HashMap<String, ProxyEndpoint>,
}

/// Immutable lookup tables shared by all requests.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    organizations: Vec<Organization>,
    formats: BTreeMap<String, PackageManagerFormat>,
    endpoints: HashMap<String, ProxyEndpoint>,
}

impl Catalog {
    pub fn new(
        organizations: Vec<Organization>,
        formats: impl IntoIterator<Item = PackageManagerFormat>,
    ) -> Self {
        Self {
            organizations,
            formats: formats
                .into_iter()
                .map(|f| (f.name.clone(), f))
                .collect(),
            endpoints: HashMap::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: HashMap<String, ProxyEndpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Loads all catalog files from `config_dir`.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let organizations: Vec<Organization> =
            load_json_file(&config_dir.join(ORGANIZATIONS_FILE))?.unwrap_or_default();

        let formats = load_json_file::<PackageManagerFile>(&config_dir.join(PACKAGE_MANAGER_FILE))?
            .unwrap_or_default()
            .supported_formats
            .into_iter()
            .map(|(name, mut format)| {
                format.name = name;
                format
            });

        let endpoints = load_json_file::<ApiEndpointsFile>(&config_dir.join(API_ENDPOINTS_FILE))?
            .unwrap_or_default()
            .proxy_repository_endpoints;

        let catalog = Self::new(organizations, formats).with_endpoints(endpoints);
        tracing::info!(
            "Loaded {} organizations and {} package manager formats from {}",
            catalog.organizations.len(),
            catalog.formats.len(),
            config_dir.display()
        );
        Ok(catalog)
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    /// Finds an organization by its exact Chinese display name.
    pub fn find_organization(&self, chinese_name: &str) -> Option<&Organization> {
        if chinese_name.is_empty() {
            return None;
        }
        self.organizations
            .iter()
            .find(|org| org.chinese_name == chinese_name)
    }

    /// Looks up a format by its exact catalog key.
    pub fn format(&self, name: &str) -> Option<&PackageManagerFormat> {
        self.formats.get(name)
    }

    /// Returns the upstream proxy URL configured for `package_manager`.
    pub fn remote_url(&self, package_manager: &str) -> Option<&str> {
        self.format(package_manager).and_then(|f| f.proxy_url())
    }

    /// Formats that can be proxied and have an upstream URL, sorted by name.
    pub fn proxy_package_managers(&self) -> Vec<String> {
        self.formats
            .values()
            .filter(|f| f.proxy_url().is_some())
            .map(|f| f.name.clone())
            .collect()
    }

    /// Filters the requested shared-eligible names down to proxy-capable formats.
    pub fn shared_package_managers(&self, requested: &[String]) -> Vec<String> {
        requested
            .iter()
            .filter(|name| {
                self.formats
                    .get(name.as_str())
                    .is_some_and(|f| f.proxy_supported)
            })
            .cloned()
            .collect()
    }

    /// Creation endpoint for a proxy repository of `format`.
    pub fn proxy_endpoint(&self, format: &PackageManagerFormat) -> ProxyEndpoint {
        self.endpoints
            .get(&format.name)
            .cloned()
            .unwrap_or_else(|| ProxyEndpoint {
                path: format!("/v1/repositories/{}/proxy", format.endpoint()),
                format_specific_config: None,
            })
    }
}

/// Reads and parses a JSON file, returning `None` when it does not exist.
fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{} not found, using an empty catalog", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| ManagerError::Configuration(format!("Invalid {}: {}", path.display(), e)))
}
