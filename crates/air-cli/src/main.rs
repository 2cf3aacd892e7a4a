//! AIR Members - dashboard core from the command line

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use air_cli::{run, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Logs go to stderr so command output stays clean
    let level = &args.log_level;
    let default_filter = format!(
        "air={level},air_cli={level},air_sdk={level},air_backend_client={level},warn"
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        anyhow::bail!(e);
    }

    if args.member_config().auth_unavailable() {
        warn!("No backend configured and demo sign-in disabled; only guest data is available");
    }

    let mut stdout = std::io::stdout().lock();
    run(&args, &mut stdout).await
}
