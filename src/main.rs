use std::sync::Arc;

use mimic::config::Config;
use mimic::routes::RouteTable;
use mimic::server::{self, MockHandler};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let table = Arc::new(RouteTable::new(&cfg.routes_file));

    // Load the route table before taking traffic.
    let warm = Arc::clone(&table);
    let count = tokio::task::spawn_blocking(move || warm.routes().len()).await?;
    tracing::info!(routes = count, file = %cfg.routes_file.display(), "Routes ready");

    let handler = Arc::new(MockHandler::new(table, cfg.debug_routes_path.clone()));

    tokio::select! {
        res = server::listener::run(&cfg.listen_addr, handler) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
