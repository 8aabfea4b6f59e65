use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Binding to {}", cli.address);
    let listener = tokio::net::TcpListener::bind(&cli.address)
        .await
        .with_context(|| format!("couldn't bind {}", cli.address))?;
    info!("Starting stub API server");
    axum::serve(listener, silicic::api::router())
        .await
        .context("stub API server failed")?;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Stub Silicic Earth API serving static JSON")]
struct Cli {
    /// Listening address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    address: String,
}
