mod cli;

use anyhow::Context;
use axum::http::Method;
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nexus_manager_server::{AppState, ServerConfig, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(cli::Cli::parse());

    // Loaded before the subscriber so RUST_LOG may come from .env.
    let env_file = config.config_dir.join(".env");
    let dotenv_result = dotenvy::from_path(&env_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nexus_manager_server=debug,nexus_manager_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv_result {
        Ok(()) => tracing::info!("Loaded environment from {}", env_file.display()),
        Err(e) if e.not_found() => {
            tracing::warn!("No .env file at {}, using process environment", env_file.display())
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to load {}", env_file.display())),
    }

    let state = AppState::load(&config.config_dir).context("Failed to load configuration")?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = routes::app(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Nexus manager listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
