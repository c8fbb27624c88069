use nostra_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (.env is optional)
    dotenv::dotenv().ok();

    // 2. Configuration + work directory
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    // 3. Logging (file output goes under work_dir/logs)
    let log_dir = config.log_dir();
    init_logger_with_file(None, log_dir.to_str());

    print_banner();
    tracing::info!("🍕 Massa Nostra server starting...");

    // 4. Initialize server state (database, services)
    let state = ServerState::initialize(&config).await?;

    // 5. Run the HTTP server until shutdown
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
