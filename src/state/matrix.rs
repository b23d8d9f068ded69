//! The Matrix - central shared state for the chat server.
//!
//! Holds the session registry, the router, runtime configuration, and the
//! server-wide shutdown token. Every session teardown goes through
//! [`Matrix::evict`].

use chat_proto::Envelope;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::metrics;
use crate::router::Router;

use super::registry::{Registry, RegistryError};
use super::session::{CloseReason, Phase, Session};
use super::uid::SessionIdGenerator;

/// Central shared state container.
pub struct Matrix {
    /// Directory of Active sessions.
    pub registry: Arc<Registry>,
    /// Outbound delivery.
    pub router: Router,
    /// Server configuration (for handlers to access).
    pub config: Config,
    ids: SessionIdGenerator,
    shutdown: CancellationToken,
}

impl Matrix {
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(Registry::new());
        let router = Router::new(Arc::clone(&registry), config.limits.max_send_overflows);
        Self {
            registry,
            router,
            config,
            ids: SessionIdGenerator::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Create a session for a freshly accepted connection.
    ///
    /// Returns the session, already in `AwaitingNickname`, and the receiving
    /// end of its outbound queue for the writer task.
    pub fn open_session(&self, addr: SocketAddr) -> (Arc<Session>, mpsc::Receiver<Arc<Envelope>>) {
        let (tx, rx) = mpsc::channel(self.config.limits.send_queue.max(1));
        let session = Session::new(self.ids.next(), addr, tx, self.shutdown.child_token());
        session.advance(Phase::Connecting, Phase::AwaitingNickname);
        (Arc::new(session), rx)
    }

    /// Register `session` under `nick`, welcome it, and announce it.
    pub fn activate(&self, session: &Arc<Session>, nick: &str) -> Result<(), RegistryError> {
        self.registry.register(session, nick)?;
        metrics::session_activated();
        info!(
            sid = %session.id(),
            nick = %nick,
            online = self.registry.len(),
            "Session registered"
        );

        self.router.reply(
            session,
            format!("Welcome, {nick}! You are now connected to the chat."),
        );
        self.router
            .broadcast_excluding(session.id(), nick, "has joined the chat.");
        Ok(())
    }

    /// Tear a session down. Idempotent: only the first call does anything.
    ///
    /// The winner moves the session to `Closing`, removes it from the
    /// registry, announces the departure if it had been Active, and cancels
    /// its tasks. Returns whether this call performed the eviction.
    pub fn evict(&self, session: &Session, reason: CloseReason) -> bool {
        let Some(previous) = session.begin_close(reason) else {
            return false;
        };

        self.registry.remove(session.id());
        if previous == Phase::Active {
            metrics::session_deactivated();
            let nick = session.nickname();
            self.router.broadcast_all(&nick, reason.departure());
            info!(sid = %session.id(), nick = %nick, reason = reason.as_str(), "Session evicted");
        } else {
            debug!(sid = %session.id(), reason = reason.as_str(), "Unregistered connection closed");
        }

        metrics::record_eviction(reason.as_str());
        session.cancel();
        true
    }

    /// Stop every session and the listener.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
