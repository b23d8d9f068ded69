//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the chat socket and spawns a Connection task for each
//! incoming client. It stops accepting when the matrix shuts down, then
//! gives the live connections a moment to announce their departures.

use crate::handlers::Dispatcher;
use crate::metrics;
use crate::network::Connection;
use crate::state::Matrix;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

/// Pause after a failed accept so fd exhaustion doesn't spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// How long shutdown waits for connection tasks to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    matrix: Arc<Matrix>,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, matrix: Arc<Matrix>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %listener.local_addr()?, "Chat listener bound");

        Ok(Self {
            listener,
            matrix,
            dispatcher: Arc::new(Dispatcher::new()),
        })
    }

    /// Run the gateway, accepting connections until shutdown.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = self.matrix.shutdown_token().clone();
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,

                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Connection task panicked");
                    }
                }

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        metrics::inc_connections();
                        info!(%addr, "Connection accepted");

                        let connection = Connection::new(
                            stream,
                            addr,
                            Arc::clone(&self.matrix),
                            Arc::clone(&self.dispatcher),
                        );
                        connections.spawn(async move {
                            if let Err(e) = connection.run().await {
                                error!(%addr, error = %e, "Connection error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }

        info!(live = connections.len(), "Gateway stopping");
        let drain = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            warn!("Connections did not close in time; aborting");
            connections.abort_all();
        }
        if !self.matrix.registry.is_empty() {
            warn!(remaining = self.matrix.registry.len(), "Sessions still registered after shutdown");
        }
        Ok(())
    }
}
