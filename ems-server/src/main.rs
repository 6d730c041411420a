use ems_server::{Config, Server, init_logger, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. .env + logging
    let _ = dotenv::dotenv();

    let mut config = Config::from_env()?;
    if std::env::args().any(|a| a == "--seed-demo") {
        config.seed_demo_data = true;
    }

    let _log_guard = init_logger(&config.log);

    print_banner();
    tracing::info!(environment = %config.environment, "EMS server starting...");

    // 2. Run until ctrl-c
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
