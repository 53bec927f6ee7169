//! Configuration for the chat relay
//!
//! Loaded once at startup from a TOML file and treated as immutable while
//! serving. See [`Config::load`].

#![allow(clippy::must_use_candidate)]

pub mod cors;
mod duration;
mod env;
mod loader;
pub mod prompt;
pub mod relay;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use cors::*;
pub use relay::*;
pub use server::*;
pub use telemetry::{ExportProtocol, ExporterConfig, TelemetryConfig};

/// Top-level relay configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat relay and upstream provider configuration
    #[serde(default)]
    pub relay: RelayConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
