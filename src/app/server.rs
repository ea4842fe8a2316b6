use crate::adapters::auth::StaticTokenAuth;
use crate::adapters::http::{router, AppState};
use crate::adapters::memory::{MemoryConnectionStore, MemoryUserDirectory};
use crate::config::TomlConfig;
use crate::core::{ConfigProvider, ConnectionWorkflow, WorkflowSettings};
use crate::utils::error::Result;
use crate::utils::validation::validate_socket_addr;
use axum::Router;
use std::sync::Arc;

/// Wires the in-memory adapters and the workflow from a loaded config.
pub fn build_state(config: &TomlConfig) -> AppState {
    let store = Arc::new(MemoryConnectionStore::new());
    let directory = Arc::new(MemoryUserDirectory::from_users(config.directory_users()));
    let auth = Arc::new(StaticTokenAuth::new(config.tokens()));

    let settings = WorkflowSettings {
        allow_self_connection: config.allow_self_connection(),
    };
    tracing::debug!(
        "Seeded {} users (self connections allowed: {})",
        config.users.len(),
        settings.allow_self_connection
    );
    if config.users.is_empty() {
        tracing::warn!("No users configured; every authenticated route will answer 401");
    }

    AppState {
        workflow: ConnectionWorkflow::new(store, directory, settings),
        auth,
    }
}

pub fn build_router(config: &TomlConfig) -> Router {
    router(build_state(config))
}

pub struct Server {
    config: TomlConfig,
}

impl Server {
    pub fn new(config: TomlConfig) -> Self {
        Self { config }
    }

    /// Serves until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        let addr = validate_socket_addr("server.bind_addr", self.config.bind_addr())?;
        let app = build_router(&self.config);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
