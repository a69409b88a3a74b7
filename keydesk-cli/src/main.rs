//! keydesk - attendee key-collection registry server
//!
//! Serves the attendee registry over HTTP: registration, partial updates,
//! the next-ready queue head, and the missed-pickup snapshot.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use keydesk_server::ServerConfig;
use tracing::info;

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "keydesk",
    version,
    about = "HTTP registry tracking event attendees from registration to key pickup"
)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3030)]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Database file path (default: ~/.keydesk/attendees.db)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_setup::init_tracing(cli.debug)?;

    let db_path = match cli.db_path {
        Some(path) => path,
        None => default_db_path().context("could not determine home directory")?,
    };

    let bind_addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .context("invalid bind address")?;

    info!("starting keydesk on http://{}", bind_addr);
    keydesk_server::run_server(ServerConfig { bind_addr, db_path }).await
}

fn default_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".keydesk").join("attendees.db"))
}
