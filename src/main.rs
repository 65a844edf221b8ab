use anyhow::Result;
use clap::Parser;
use tracing::info;

use po_translate::{cli::Cli, config::Config, runner};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("po_translate=info".parse()?),
        )
        .init();

    let args = Cli::parse();

    info!("Starting translation run");
    let config = Config::from_env()?;

    runner::run(&config, &args.langs, args.creative).await
}
