use color_eyre::eyre;
use dockview_runtime::DockerRuntime;
use dockview_server::{config::ServerConfig, create_app, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dockview_server=debug")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // One engine connection, shared by every request for the life of the process
    let runtime = DockerRuntime::connect(config.docker_socket.as_deref())?;
    let state = AppState::new(Arc::new(runtime));

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Container dashboard listening on http://{}", config.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
