//! Application state for the nexus-manager server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nexus_manager_core::catalog::Catalog;
use nexus_manager_core::config::{EnvSchema, Settings};

/// File listing the environment variables the service honours.
pub const ENV_TEMPLATE_FILE: &str = ".env.example";

/// Server configuration resolved from the command line.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory holding `.env`, `.env.example` and the JSON catalogs.
    pub config_dir: PathBuf,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared application state.
///
/// Catalogs and honoured settings are read once at startup and never change.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        Self {
            catalog: Arc::new(catalog),
            settings: Arc::new(settings),
        }
    }

    /// Loads the catalogs and allow-listed settings from `config_dir`.
    pub fn load(config_dir: &Path) -> nexus_manager_core::Result<Self> {
        let schema = EnvSchema::load(&config_dir.join(ENV_TEMPLATE_FILE))?;
        let settings = Settings::from_env(&schema);
        let catalog = Catalog::load(config_dir)?;

        tracing::info!(
            "Honouring {} environment keys from {}",
            schema.len(),
            config_dir.join(ENV_TEMPLATE_FILE).display()
        );

        Ok(Self::new(catalog, settings))
    }
}
