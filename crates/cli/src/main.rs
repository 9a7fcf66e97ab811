//! oidcache CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oidcache_cli::cli::Cli;
use oidcache_cli::commands::{execute, Context};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oidcache=info,oidcache_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = Context::open(&cli.sqlite_path).await?;
    let output = execute(&ctx, &cli.provider, cli.command, cli.format).await?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
