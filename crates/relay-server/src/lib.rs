mod cors;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use relay_chat::{ChatState, Relay};
use relay_config::Config;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream provider client cannot be built
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let relay = Relay::from_config(&config.relay)?;
        Ok(Self::with_relay(config, Arc::new(relay)))
    }

    /// Build the server around an already constructed relay
    pub fn with_relay(config: &Config, relay: Arc<Relay>) -> Self {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        let state = ChatState::new(relay, config.relay.framing);
        app = app.merge(relay_chat::chat_router(state, &config.relay.path));

        app = app.layer(TraceLayer::new_for_http());

        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        tracing::debug!(
            path = %config.relay.path,
            framing = ?config.relay.framing,
            model = %config.relay.model,
            "relay routes assembled"
        );

        Self {
            router: app,
            listen_address,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. In-flight streams are
    /// allowed to finish; dropping a client connection cancels its relay.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "relay listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
