//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use relay_config::{Config, CorsConfig, Framing};
use secrecy::SecretString;

/// System prompt used by every test config
pub const TEST_SYSTEM_PROMPT: &str = "You are the AI 4U test assistant.";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.relay.model = "mock-model".to_owned();
        config.relay.system_prompt = TEST_SYSTEM_PROMPT.to_owned();
        config.relay.first_byte_timeout = Duration::from_secs(5);

        Self { config }
    }

    /// Point the relay at a mock upstream
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.config.relay.upstream.base_url = Some(base_url.parse().expect("valid URL"));
        self.config.relay.upstream.api_key = Some(SecretString::from("test-key"));
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.config.relay.framing = framing;
        self
    }

    pub fn with_first_byte_timeout(mut self, timeout: Duration) -> Self {
        self.config.relay.first_byte_timeout = timeout;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
