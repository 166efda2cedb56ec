//! landmark_relay: routes hand frames between named participants.

use anyhow::Result;
use clap::Parser;
use landmark_relay::{RelayConfig, RelayServer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "landmark_relay")]
#[command(about = "Relay hand landmark frames between duel participants")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let cfg = RelayConfig { host: args.host, port: args.port };
    let server = RelayServer::bind(&cfg)?;
    info!("relay ready on {}", server.local_addr()?);

    server.run()?;
    Ok(())
}
