pub mod adapters;
pub mod app;
mod assets;
pub mod auth;
pub mod config;
pub mod notify;
pub mod ports;
pub mod state;
pub mod types;

pub use app::{StartupError, app, router};
pub use auth::generate_auth_key;

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

pub async fn serve(config: config::AppConfig) -> Result<(), ServeError> {
    let router = app(&config)?;
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.listen,
            source,
        })?;
    tracing::info!(addr = %config.listen, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
