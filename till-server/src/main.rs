use till_server::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env values feed Config::from_env, so load it first
    dotenv::dotenv().ok();

    print_banner();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir();
    init_logger_with_file("info", config.is_production(), Some(logs_dir.as_path()))?;

    tracing::info!(
        port = config.http_port,
        environment = %config.environment,
        "Till server starting..."
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}
