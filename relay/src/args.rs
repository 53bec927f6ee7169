use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Streaming chat relay
#[derive(Debug, Parser)]
#[command(name = "chat-relay", about = "Relays chat conversations to an LLM provider as an ordered token stream")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "RELAY_LISTEN")]
    pub listen: Option<SocketAddr>,
}
