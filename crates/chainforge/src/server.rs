//! Server builder and accept loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use chainforge_protocol::{Codec, JsonCodec};
use chainforge_room::{RegistryConfig, RegistryHandle, spawn_registry};
use chainforge_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ChainforgeError, ServerConfig};

/// What every connection handler shares.
pub(crate) struct ServerState<C: Codec> {
    pub registry: RegistryHandle,
    pub codec: C,
}

/// Builder for configuring and starting a [`ChainforgeServer`].
///
/// # Example
///
/// ```rust,no_run
/// use chainforge::prelude::*;
///
/// # async fn example() -> Result<(), ChainforgeError> {
/// let server = ChainforgeServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChainforgeServerBuilder {
    config: ServerConfig,
}

impl ChainforgeServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to listen on. Default: `127.0.0.1:8080`.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// Sets board, seat, sweep and channel settings for the registry.
    pub fn registry_config(mut self, registry: RegistryConfig) -> Self {
        self.config.registry = registry;
        self
    }

    /// Replaces the whole configuration, e.g. with
    /// [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and starts the registry, speaking JSON.
    pub async fn build(self) -> Result<ChainforgeServer<JsonCodec>, ChainforgeError> {
        self.build_with_codec(JsonCodec).await
    }

    /// Binds the listener and starts the registry with a custom codec.
    pub async fn build_with_codec<C: Codec>(
        self,
        codec: C,
    ) -> Result<ChainforgeServer<C>, ChainforgeError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let registry = spawn_registry(self.config.registry);

        Ok(ChainforgeServer {
            transport,
            state: Arc::new(ServerState { registry, codec }),
        })
    }
}

/// A bound server, ready to accept connections.
pub struct ChainforgeServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ChainforgeServer<JsonCodec> {
    pub fn builder() -> ChainforgeServerBuilder {
        ChainforgeServerBuilder::new()
    }
}

impl<C: Codec> ChainforgeServer<C> {
    /// The address the server is listening on. Useful after binding to
    /// port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Handle to the room registry, for queries and shutdown.
    pub fn registry(&self) -> &RegistryHandle {
        &self.state.registry
    }

    /// Accepts connections forever, one task per connection.
    pub async fn run(self) -> Result<(), ChainforgeError> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves, then stops the
    /// registry. Connections already open see their outbound channel
    /// close and wind down on their own.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), ChainforgeError> {
        tracing::info!("chainforge server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection handler ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                    }
                },
                () = &mut shutdown => break,
            }
        }

        tracing::info!("chainforge server shutting down");
        self.state.registry.shutdown().await?;
        Ok(())
    }
}
