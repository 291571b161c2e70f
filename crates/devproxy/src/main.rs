//! `equipment-devproxy`: development reverse proxy for the equipment ledger API.
//!
//! Usage:
//!   equipment-devproxy [--listen <addr>] [--upstream <origin>]
//!
//! Everything under `/api` is forwarded to the upstream with only the origin
//! rewritten. Not meant for production use.

mod proxy;

use clap::Parser;
use tracing::info;

use proxy::{ProxyState, DEFAULT_LISTEN, DEFAULT_UPSTREAM};

/// Development proxy for the equipment ledger API.
#[derive(Parser, Debug)]
#[command(name = "equipment-devproxy", about = "Development proxy for the equipment ledger API")]
struct Cli {
    /// Address to listen on.
    #[arg(long = "listen", default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Upstream origin (scheme, host and port).
    #[arg(long = "upstream", default_value = DEFAULT_UPSTREAM)]
    upstream: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let state = ProxyState::new(&cli.upstream);
    let app = proxy::router(state.clone());

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Proxy listening on {}, forwarding /api to {}", cli.listen, state.upstream());
    axum::serve(listener, app).await?;

    Ok(())
}
