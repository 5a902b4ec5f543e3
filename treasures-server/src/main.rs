use treasures_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, work dir, logging
    setup_environment()?;

    print_banner();

    // 2. configuration
    let config = Config::from_env()?;
    tracing::info!(
        port = config.http_port,
        work_dir = %config.work_dir,
        backend = ?config.store_backend,
        "Treasures server starting"
    );

    // 3. stores and repositories
    let state = ServerState::initialize(&config).await?;

    // 4. serve until Ctrl+C
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
