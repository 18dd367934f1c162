use clap::Parser;
use std::path::PathBuf;

use nexus_manager_server::ServerConfig;

/// Nexus Manager - proxy repository and privilege provisioning for Nexus
#[derive(Parser, Debug)]
#[command(name = "nexus-manager")]
#[command(version = nexus_manager_core::VERSION)]
#[command(about = "HTTP service provisioning Nexus proxy repositories and privileges", long_about = None)]
pub struct Cli {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory with .env, .env.example and catalog JSON files
    #[arg(long, env = "NEXUS_MANAGER_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config_dir: cli.config_dir,
        }
    }
}
