//! IQ Server role membership client.

use reqwest::Method;
use serde::Deserialize;

use crate::config::RemoteCredentials;
use crate::error::Result;

use super::{create_http_client, ApiClient};

/// Name of the IQ Server role granted on the requesting user's organization.
pub const OWNER_ROLE: &str = "Owner";

#[derive(Debug, Clone, Deserialize)]
pub struct IqRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RolesResponse {
    #[serde(default)]
    roles: Vec<IqRole>,
}

/// Client for IQ Server organization role memberships.
#[derive(Debug)]
pub struct IqServerClient {
    api: ApiClient,
}

impl IqServerClient {
    /// Creates a new IQ Server client.
    pub fn new(credentials: &RemoteCredentials) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(create_http_client()?, credentials),
        })
    }

    /// Fetches all roles.
    pub async fn get_roles(&self) -> Result<Vec<IqRole>> {
        let url = self.api.url(["api", "v2", "roles"])?;
        let response: Option<RolesResponse> = self.api.get_json(url).await?;
        Ok(response.unwrap_or_default().roles)
    }

    /// Finds the id of the `Owner` role.
    pub async fn find_owner_role_id(&self) -> Result<Option<String>> {
        Ok(self
            .get_roles()
            .await?
            .into_iter()
            .find(|role| role.name == OWNER_ROLE)
            .map(|role| role.id))
    }

    /// Grants `role_id` to `member` on `organization_id`.
    pub async fn grant_role_to_user(&self, organization_id: &str, role_id: &str, member: &str) -> Result<()> {
        let url = self.membership_url(organization_id, role_id, member)?;
        self.api
            .send_expecting::<()>(Method::PUT, url, None, "IQ Server role grant")
            .await?;
        Ok(())
    }

    /// Revokes `role_id` from `member` on `organization_id`.
    pub async fn revoke_role_from_user(&self, organization_id: &str, role_id: &str, member: &str) -> Result<()> {
        let url = self.membership_url(organization_id, role_id, member)?;
        self.api.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    fn membership_url(&self, organization_id: &str, role_id: &str, member: &str) -> Result<url::Url> {
        self.api.url([
            "api",
            "v2",
            "roleMemberships",
            "organization",
            organization_id,
            "role",
            role_id,
            "user",
            member,
        ])
    }
}
