//! Allow-listed environment settings and remote system configuration.
//!
//! The set of honoured environment keys is declared by a template file
//! (`.env.example`). Only keys present in that template are ever read; any
//! other variable is ignored even when set. The schema and the honoured values
//! are captured once at startup and shared read-only afterwards.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use secrecy::SecretString;
use url::Url;

use crate::error::{ManagerError, Result};

pub const NEXUS_URL: &str = "NEXUS_URL";
pub const NEXUS_USERNAME: &str = "NEXUS_USERNAME";
pub const NEXUS_PASSWORD: &str = "NEXUS_PASSWORD";
pub const IQSERVER_URL: &str = "IQSERVER_URL";
pub const IQSERVER_USERNAME: &str = "IQSERVER_USERNAME";
pub const IQSERVER_PASSWORD: &str = "IQSERVER_PASSWORD";
pub const EXTRA_ROLE: &str = "EXTRA_ROLE";
pub const SHARED_PACKAGE_MANAGERS: &str = "SHARED_PACKAGE_MANAGERS";

/// Shared-eligible formats used when `SHARED_PACKAGE_MANAGERS` is not set.
pub const DEFAULT_SHARED_PACKAGE_MANAGERS: &str = "npm,maven2,nuget,yum,raw";

/// Declared set of environment keys the service is allowed to read.
#[derive(Debug, Clone, Default)]
pub struct EnvSchema {
    keys: HashSet<String>,
}

impl EnvSchema {
    /// Parses a dotenv-style template. Every non-comment `KEY=...` line
    /// declares one key.
    pub fn parse(template: &str) -> Self {
        let keys = template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, _)| key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();

        Self { keys }
    }

    /// Loads the template at `path`. A missing template yields an empty schema.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Environment template {} not found, no environment keys will be honoured",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(ManagerError::Configuration(format!(
                "Failed to read environment template {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Builds a schema from an explicit list of keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Snapshot of honoured environment values.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Captures the allow-listed keys from the process environment.
    pub fn from_env(schema: &EnvSchema) -> Self {
        Self::from_lookup(schema, |key| std::env::var(key).ok())
    }

    /// Captures the allow-listed keys using `lookup`. Keys outside the schema
    /// are never queried, and empty values are treated as unset.
    pub fn from_lookup<F>(schema: &EnvSchema, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = schema
            .keys
            .iter()
            .filter_map(|key| {
                lookup(key)
                    .filter(|value| !value.is_empty())
                    .map(|value| (key.clone(), value))
            })
            .collect();

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Role names always bound to the requesting user alongside their own role.
    pub fn extra_roles(&self) -> Vec<String> {
        parse_csv(self.get(EXTRA_ROLE).unwrap_or(""))
    }

    /// Package manager names designated as shared-eligible, before catalog filtering.
    pub fn shared_package_managers(&self) -> Vec<String> {
        parse_csv(
            self.get(SHARED_PACKAGE_MANAGERS)
                .unwrap_or(DEFAULT_SHARED_PACKAGE_MANAGERS),
        )
    }
}

/// Splits a comma-separated value, trimming entries and dropping empty ones.
pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Connection parameters for one remote system.
#[derive(Debug)]
pub struct RemoteCredentials {
    pub url: Url,
    pub username: String,
    pub password: SecretString,
}

/// Connection parameters for Nexus and IQ Server.
#[derive(Debug)]
pub struct SystemConfig {
    pub nexus: RemoteCredentials,
    pub iq_server: RemoteCredentials,
}

impl SystemConfig {
    /// Resolves the remote system configuration from honoured settings.
    ///
    /// Every missing key is reported at once as a misconfiguration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let required = [
            NEXUS_URL,
            NEXUS_USERNAME,
            NEXUS_PASSWORD,
            IQSERVER_URL,
            IQSERVER_USERNAME,
            IQSERVER_PASSWORD,
        ];

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| settings.get(key).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(ManagerError::Misconfiguration(format!(
                "Missing system configuration: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            nexus: credentials(settings, NEXUS_URL, NEXUS_USERNAME, NEXUS_PASSWORD)?,
            iq_server: credentials(settings, IQSERVER_URL, IQSERVER_USERNAME, IQSERVER_PASSWORD)?,
        })
    }
}

fn credentials(
    settings: &Settings,
    url_key: &str,
    username_key: &str,
    password_key: &str,
) -> Result<RemoteCredentials> {
    let raw_url = settings.get(url_key).unwrap_or_default();
    let url = Url::parse(raw_url)
        .map_err(|e| ManagerError::Misconfiguration(format!("Invalid {}: {}", url_key, e)))?;

    Ok(RemoteCredentials {
        url,
        username: settings.get(username_key).unwrap_or_default().to_string(),
        password: SecretString::from(settings.get(password_key).unwrap_or_default().to_string()),
    })
}
