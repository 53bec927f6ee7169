use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents fail
    /// [`Config::parse`]
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration text
    ///
    /// Expands `{{ env.VAR }}` placeholders, deserializes, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, TOML parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is usable for serving
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        let relay = &self.relay;

        if relay.model.trim().is_empty() {
            anyhow::bail!("relay.model must not be empty");
        }

        if relay.system_prompt.trim().is_empty() {
            anyhow::bail!("relay.system_prompt must not be empty");
        }

        if relay.first_byte_timeout.is_zero() {
            anyhow::bail!("relay.first_byte_timeout must be greater than zero");
        }

        if !relay.path.starts_with('/') {
            anyhow::bail!("relay.path must start with '/'");
        }

        if let Some(temperature) = relay.upstream.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            anyhow::bail!("relay.upstream.temperature must be between 0.0 and 2.0");
        }

        if relay.upstream.max_tokens == Some(0) {
            anyhow::bail!("relay.upstream.max_tokens must be greater than zero");
        }

        if let Some(ref key) = relay.upstream.api_key
            && key.expose_secret().trim().is_empty()
        {
            anyhow::bail!("relay.upstream.api_key must not be empty when set");
        }

        if self.server.health.enabled && self.server.health.path == relay.path {
            anyhow::bail!("server.health.path conflicts with relay.path");
        }

        if let Some(ref telemetry) = self.telemetry
            && !(0.0..=1.0).contains(&telemetry.sampling_rate)
        {
            anyhow::bail!("telemetry.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}
