//! Message Router: builds envelopes and hands them to session queues.
//!
//! Delivery never blocks. Recipients are snapshotted from the registry, the
//! lock is released, and each envelope is offered to the recipient's bounded
//! queue with `try_send`. A full queue drops that one envelope for that one
//! recipient and counts a strike; enough consecutive strikes and the
//! recipient is asked to close as a slow consumer.

use chat_proto::Envelope;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::metrics;
use crate::state::{CloseReason, Registry, Session, SessionId};

/// Unicast failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no active session named {0}")]
    NoSuchNick(String),
}

/// Outbound delivery over the shared registry.
pub struct Router {
    registry: Arc<Registry>,
    max_overflows: u32,
}

impl Router {
    pub fn new(registry: Arc<Registry>, max_overflows: u32) -> Self {
        Self {
            registry,
            max_overflows: max_overflows.max(1),
        }
    }

    /// Offer one envelope to one session's queue.
    ///
    /// Returns whether it was enqueued. Used for direct replies, which reach
    /// the session whatever its phase.
    pub fn deliver(&self, session: &Session, envelope: Arc<Envelope>) -> bool {
        match session.try_send(envelope) {
            Ok(()) => {
                session.reset_overflows();
                metrics::inc_messages_sent();
                true
            }
            Err(TrySendError::Full(_)) => {
                metrics::inc_messages_dropped();
                let strikes = session.record_overflow();
                warn!(
                    sid = %session.id(),
                    strikes,
                    "Send queue full, envelope dropped"
                );
                if strikes >= self.max_overflows {
                    session.request_close(CloseReason::SlowConsumer);
                }
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(sid = %session.id(), "Send queue closed, envelope dropped");
                false
            }
        }
    }

    /// Send a SERVER message to one session.
    pub fn reply(&self, session: &Session, text: impl Into<String>) -> bool {
        self.deliver(session, Arc::new(Envelope::server(text)))
    }

    /// Deliver to every Active session. Returns the recipient count.
    pub fn broadcast_all(&self, sender: &str, text: &str) -> usize {
        self.fan_out(Envelope::new(sender, text), None)
    }

    /// Deliver to every Active session except `exclude`.
    pub fn broadcast_excluding(&self, exclude: SessionId, sender: &str, text: &str) -> usize {
        self.fan_out(Envelope::new(sender, text), Some(exclude))
    }

    /// Deliver to the Active session named `target`.
    pub fn unicast(&self, target: &str, envelope: Envelope) -> Result<(), RouteError> {
        let recipient = self
            .registry
            .lookup(target)
            .filter(|s| s.is_active())
            .ok_or_else(|| RouteError::NoSuchNick(target.to_owned()))?;
        self.deliver(&recipient, Arc::new(envelope));
        Ok(())
    }

    fn fan_out(&self, envelope: Envelope, exclude: Option<SessionId>) -> usize {
        let envelope = Arc::new(envelope);
        let mut delivered = 0;
        for session in self.registry.snapshot() {
            if Some(session.id()) == exclude || !session.is_active() {
                continue;
            }
            if self.deliver(&session, Arc::clone(&envelope)) {
                delivered += 1;
            }
        }
        metrics::record_fanout(delivered);
        delivered
    }
}
