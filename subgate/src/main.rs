mod http;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use subgate_core::{
    bootstrap::{init_database, init_services, load_config},
    logging,
};

use server::SubgateServer;

#[derive(Parser, Debug)]
#[command(name = "subgate")]
#[command(about = "Subscriber-only access control for hosted video", long_about = None)]
struct Cli {
    /// Path to a YAML or TOML config file
    #[arg(short, long, env = "SUBGATE_CONFIG_PATH")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = load_config(cli.config.as_deref())?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        http_address = %config.http_address(),
        plugin = %config.plugin.name,
        "subgate starting"
    );

    // 3. Initialize database
    let pool = init_database(&config).await?;

    // 4. Initialize services and load the current policy
    let services = init_services(pool, &config).await?;

    // 5. Serve until shutdown
    SubgateServer::new(config, services).start().await?;

    info!("subgate stopped");
    Ok(())
}
