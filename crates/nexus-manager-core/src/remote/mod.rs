//! HTTP clients for the remote systems (Nexus and IQ Server).

pub mod iq;
pub mod nexus;

use reqwest::{Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::config::RemoteCredentials;
use crate::error::{ManagerError, Result};

pub use iq::IqServerClient;
pub use nexus::NexusClient;

/// Creates the HTTP client used for remote admin APIs.
pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent(concat!("nexus-manager/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ManagerError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// JSON API client with basic authentication rooted at a base URL.
///
/// A `404` response means "absent" and is returned as `None`; every other
/// non-success status is an error carrying the method, URL, status and body.
#[derive(Debug)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl ApiClient {
    pub(crate) fn new(client: reqwest::Client, credentials: &RemoteCredentials) -> Self {
        Self {
            client,
            base_url: credentials.url.clone(),
            username: credentials.username.clone(),
            password: SecretString::from(credentials.password.expose_secret().to_string()),
        }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub(crate) fn url<I, S>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ManagerError::Misconfiguration(format!("Invalid base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and returns the response, or `None` on `404`.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Option<Response>> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ManagerError::Remote(format!("API {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ManagerError::Remote(format!(
                "{} {} failed: {} {}",
                method,
                url,
                status.as_u16(),
                body
            )));
        }

        Ok(Some(response))
    }

    /// Sends a request whose target must exist.
    pub(crate) async fn send_expecting<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        operation: &str,
    ) -> Result<Response> {
        let target = url.to_string();
        self.send(method, url, body).await?.ok_or_else(|| {
            ManagerError::Remote(format!("{} failed: {} returned 404", operation, target))
        })
    }

    /// Fetches and decodes a JSON resource, or `None` when absent.
    pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let target = url.to_string();
        match self.send::<()>(Method::GET, url, None).await? {
            Some(response) => response.json().await.map(Some).map_err(|e| {
                ManagerError::Remote(format!("Failed to parse response from {}: {}", target, e))
            }),
            None => Ok(None),
        }
    }
}

/// Splits a configured path such as `/v1/repositories/npm/proxy` into segments.
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
