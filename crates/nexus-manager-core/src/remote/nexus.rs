//! Nexus Repository Manager REST client.
//!
//! Covers the repository, privilege, role and user endpoints under
//! `{base}/service/rest`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::catalog::{PackageManagerFormat, ProxyEndpoint};
use crate::config::RemoteCredentials;
use crate::error::Result;

use super::{create_http_client, path_segments, ApiClient};

const REST_PREFIX: [&str; 2] = ["service", "rest"];

/// Actions granted by repository-view privileges.
pub const PRIVILEGE_ACTIONS: [&str; 5] = ["BROWSE", "READ", "EDIT", "ADD", "DELETE"];

/// Repository as returned by `GET /v1/repositories/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NexusRepository {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(rename = "type", default)]
    pub repository_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub proxy: Option<ProxyAttributes>,
    #[serde(default)]
    pub attributes: Option<RepositoryAttributes>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyAttributes {
    #[serde(default)]
    pub remote_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryAttributes {
    #[serde(default)]
    pub proxy: Option<ProxyAttributes>,
}

impl NexusRepository {
    /// Upstream URL of a proxy repository, wherever the API version reports it.
    pub fn remote_url(&self) -> Option<&str> {
        self.proxy
            .as_ref()
            .or_else(|| self.attributes.as_ref().and_then(|a| a.proxy.as_ref()))
            .and_then(|p| p.remote_url.as_deref())
    }
}

/// Privilege as returned by `GET /v1/security/privileges/{name}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NexusPrivilege {
    pub name: String,
    #[serde(rename = "type", default)]
    pub privilege_type: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Role document. Unknown fields are kept so updates do not drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexusRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User document. Unknown fields are kept so updates do not drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NexusUser {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client for the Nexus Repository Manager administrative API.
#[derive(Debug)]
pub struct NexusClient {
    api: ApiClient,
}

impl NexusClient {
    /// Creates a new Nexus client.
    pub fn new(credentials: &RemoteCredentials) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(create_http_client()?, credentials),
        })
    }

    fn rest_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<url::Url> {
        self.api.url(REST_PREFIX.into_iter().chain(segments))
    }

    /// Gets a repository by name.
    pub async fn get_repository(&self, name: &str) -> Result<Option<NexusRepository>> {
        let url = self.rest_url(["v1", "repositories", name])?;
        self.api.get_json(url).await
    }

    /// Creates a proxy repository for `format` mirroring `remote_url`.
    pub async fn create_proxy_repository(
        &self,
        name: &str,
        format: &PackageManagerFormat,
        endpoint: &ProxyEndpoint,
        remote_url: &str,
    ) -> Result<()> {
        let payload = proxy_repository_payload(name, format, endpoint, remote_url);
        let url = self.rest_url(path_segments(&endpoint.path))?;
        self.api
            .send_expecting(Method::POST, url, Some(&payload), "Repository creation")
            .await?;
        Ok(())
    }

    /// Deletes a repository. Returns false if it was already absent.
    pub async fn delete_repository(&self, name: &str) -> Result<bool> {
        let url = self.rest_url(["v1", "repositories", name])?;
        Ok(self.api.send::<()>(Method::DELETE, url, None).await?.is_some())
    }

    /// Gets a privilege by name.
    pub async fn get_privilege(&self, name: &str) -> Result<Option<NexusPrivilege>> {
        let url = self.rest_url(["v1", "security", "privileges", name])?;
        self.api.get_json(url).await
    }

    /// Creates a repository-view privilege over `repository`.
    pub async fn create_privilege(
        &self,
        name: &str,
        repository: &str,
        format: &PackageManagerFormat,
    ) -> Result<()> {
        let payload = json!({
            "name": name,
            "description": format!("All permissions for repository '{}'", repository),
            "actions": PRIVILEGE_ACTIONS,
            "format": format.privilege_format(),
            "repository": repository,
        });
        let url = self.rest_url(["v1", "security", "privileges", "repository-view"])?;
        self.api
            .send_expecting(Method::POST, url, Some(&payload), "Privilege creation")
            .await?;
        Ok(())
    }

    /// Deletes a privilege. Returns false if it was already absent.
    pub async fn delete_privilege(&self, name: &str) -> Result<bool> {
        let url = self.rest_url(["v1", "security", "privileges", name])?;
        Ok(self.api.send::<()>(Method::DELETE, url, None).await?.is_some())
    }

    /// Gets a role by id.
    pub async fn get_role(&self, name: &str) -> Result<Option<NexusRole>> {
        let url = self.rest_url(["v1", "security", "roles", name])?;
        self.api.get_json(url).await
    }

    /// Creates a role holding `privileges`.
    pub async fn create_role(&self, name: &str, description: &str, privileges: &[String]) -> Result<()> {
        let role = NexusRole {
            id: name.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            privileges: privileges.to_vec(),
            roles: Vec::new(),
            extra: Map::new(),
        };
        let url = self.rest_url(["v1", "security", "roles"])?;
        self.api
            .send_expecting(Method::POST, url, Some(&role), "Role creation")
            .await?;
        Ok(())
    }

    /// Replaces a role document.
    pub async fn update_role(&self, role: &NexusRole) -> Result<()> {
        let url = self.rest_url(["v1", "security", "roles", role.id.as_str()])?;
        self.api
            .send_expecting(Method::PUT, url, Some(role), "Role update")
            .await?;
        Ok(())
    }

    /// Deletes a role. Returns false if it was already absent.
    pub async fn delete_role(&self, name: &str) -> Result<bool> {
        let url = self.rest_url(["v1", "security", "roles", name])?;
        Ok(self.api.send::<()>(Method::DELETE, url, None).await?.is_some())
    }

    /// Finds a user by exact user id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<NexusUser>> {
        let mut url = self.rest_url(["v1", "security", "users"])?;
        url.query_pairs_mut().append_pair("userId", user_id);

        let users: Vec<NexusUser> = self.api.get_json(url).await?.unwrap_or_default();
        Ok(users.into_iter().find(|u| u.user_id == user_id))
    }

    /// Replaces a user document.
    pub async fn update_user(&self, user: &NexusUser) -> Result<()> {
        let url = self.rest_url(["v1", "security", "users", user.user_id.as_str()])?;
        self.api
            .send_expecting(Method::PUT, url, Some(user), "User update")
            .await?;
        Ok(())
    }
}

/// Builds the creation payload for a proxy repository.
///
/// Format defaults from the catalog land under the attribute key Nexus expects
/// for that format; formats without a dedicated key are merged at the top level.
pub fn proxy_repository_payload(
    name: &str,
    format: &PackageManagerFormat,
    endpoint: &ProxyEndpoint,
    remote_url: &str,
) -> Value {
    let mut payload = json!({
        "name": name,
        "online": true,
        "storage": {
            "blobStoreName": "default",
            "strictContentTypeValidation": true,
        },
        "proxy": {
            "remoteUrl": remote_url,
            "contentMaxAge": 1440,
            "metadataMaxAge": 1440,
        },
        "negativeCache": {"enabled": true, "timeToLive": 1440},
        "httpClient": {"blocked": false, "autoBlock": true},
    });

    if let Some(object) = payload.as_object_mut() {
        if let Some(extra) = &endpoint.format_specific_config {
            object.extend(extra.clone());
        }

        if let Some(defaults) = format.default_config.as_ref().filter(|d| !is_empty_object(d)) {
            match format_attribute_key(&format.name) {
                Some(key) => {
                    object.insert(key.to_string(), defaults.clone());
                }
                None => {
                    if let Some(fields) = defaults.as_object() {
                        object.extend(fields.clone());
                    }
                }
            }
        }
    }

    payload
}

fn format_attribute_key(format: &str) -> Option<&'static str> {
    match format.to_lowercase().as_str() {
        "apt" => Some("apt"),
        "maven2" => Some("maven"),
        "npm" => Some("npm"),
        "pypi" => Some("pypi"),
        "nuget" => Some("nugetProxy"),
        "yum" => Some("yumSigning"),
        _ => None,
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}
