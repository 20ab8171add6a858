//! heat - a deliberately CPU-hungry HTTP service for load and stress tests.
//!
//! Routes:
//! - `GET /pbkdf2?iter=&par=&keylen=&digest=` - repeated PBKDF2 key derivation
//! - `GET /primes?limit=` - naive prime counting
//! - `GET /matmul?n=` - dense matrix multiplication
//! - `GET /` - usage hint

use anyhow::{Context, Result};
use clap::Parser;
use heat_observability::init_logging;
use heat_server::{generate_default_config, ConfigOverrides, ExecutionMode, Server, ServerConfig};

/// Run in a lab or test environment only.
#[derive(Parser)]
#[command(name = "heat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = ServerConfig::resolve(&cli.overrides).context("Failed to load configuration")?;
    init_logging(&config.log).context("Failed to initialize logging")?;

    // Inline mode keeps a single thread so a running workload blocks the
    // whole service.
    let runtime = match config.execution {
        ExecutionMode::Inline => tokio::runtime::Builder::new_current_thread(),
        ExecutionMode::Offload => tokio::runtime::Builder::new_multi_thread(),
    }
    .enable_all()
    .build()
    .context("Failed to build tokio runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> Result<()> {
    let execution = config.execution;
    let server = Server::bind(config).await.context("Failed to start server")?;

    tracing::info!(execution = %execution, "{}", server.banner());

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
