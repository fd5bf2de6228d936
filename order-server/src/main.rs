use std::time::Duration;

use order_server::core::tasks::spawn_session_purge;
use order_server::core::{BackgroundTasks, Config, Server, ServerState};
use order_server::utils::init_logger_with_file;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_logger_with_file(&config.log_level, config.log_dir.as_deref());

    tracing::info!(
        "Starting order-server {} (env: {})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );
    if !config.allow_multiple_active_sessions {
        tracing::info!("One active table session per table");
    }

    let purge_interval = Duration::from_secs(config.session_purge_interval_secs);
    let state = ServerState::initialize(config).await?;

    let mut tasks = BackgroundTasks::new(state.shutdown.clone());
    spawn_session_purge(&mut tasks, state.sessions.clone(), purge_interval);

    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down...");
        shutdown.cancel();
    });

    let server = Server::new(state.clone());
    let result = server.run(state.shutdown.clone()).await;

    tasks.shutdown().await;
    result?;
    Ok(())
}
