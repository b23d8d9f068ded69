//! Per-connection session state.
//!
//! A [`Session`] is shared (`Arc`) between the connection's reader, writer,
//! and heartbeat tasks and the [`Registry`](super::Registry). Its lifecycle
//! is an explicit [`Phase`]:
//!
//! ```text
//! Connecting ─▶ AwaitingNickname ─▶ Active ─▶ Closing ─▶ Closed
//!                      │                         ▲
//!                      └─────────────────────────┘
//! ```
//!
//! Every transition is a compare-and-set under the session's lifecycle lock,
//! so exactly one caller wins the move into `Closing`.

use chat_proto::Envelope;
use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{Duration, Instant};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::uid::SessionId;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepted, not yet greeted.
    Connecting,
    /// Greeted, waiting for an acceptable nickname. Not in the registry.
    AwaitingNickname,
    /// Registered under a unique nickname; receives broadcasts.
    Active,
    /// Eviction in progress.
    Closing,
    /// Transport released. Terminal.
    Closed,
}

impl Phase {
    /// Whether the session has not started closing yet.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Connecting | Self::AwaitingNickname | Self::Active)
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Client sent `QUIT`.
    Quit,
    /// Client closed the transport.
    Eof,
    /// Read or write failure on the transport.
    TransportError,
    /// No `HEARTBEAT` within the timeout.
    HeartbeatTimeout,
    /// Outbound queue stayed full.
    SlowConsumer,
    /// No nickname chosen in time.
    NegotiationTimeout,
    /// Server is stopping.
    ServerShutdown,
}

impl CloseReason {
    /// Text of the departure notice broadcast to remaining sessions.
    pub fn departure(self) -> &'static str {
        match self {
            Self::Quit | Self::Eof => "has left the chat.",
            Self::TransportError
            | Self::HeartbeatTimeout
            | Self::SlowConsumer
            | Self::NegotiationTimeout
            | Self::ServerShutdown => "has been disconnected.",
        }
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Eof => "eof",
            Self::TransportError => "transport_error",
            Self::HeartbeatTimeout => "heartbeat_timeout",
            Self::SlowConsumer => "slow_consumer",
            Self::NegotiationTimeout => "negotiation_timeout",
            Self::ServerShutdown => "server_shutdown",
        }
    }
}

#[derive(Debug)]
struct Lifecycle {
    phase: Phase,
    reason: Option<CloseReason>,
}

/// Server-side record of one connected client.
pub struct Session {
    id: SessionId,
    addr: SocketAddr,
    /// Written only while the registry lock is held.
    nickname: RwLock<String>,
    lifecycle: Mutex<Lifecycle>,
    last_heartbeat: Mutex<Instant>,
    outbound: mpsc::Sender<Arc<Envelope>>,
    overflows: AtomicU32,
    /// Reason recorded by whoever asked for the close before eviction ran.
    requested: Mutex<Option<CloseReason>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("nickname", &*self.nickname.read())
            .field("phase", &self.phase())
            .finish()
    }
}

impl Session {
    pub fn new(
        id: SessionId,
        addr: SocketAddr,
        outbound: mpsc::Sender<Arc<Envelope>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            addr,
            nickname: RwLock::new(String::new()),
            lifecycle: Mutex::new(Lifecycle {
                phase: Phase::Connecting,
                reason: None,
            }),
            last_heartbeat: Mutex::new(Instant::now()),
            outbound,
            overflows: AtomicU32::new(0),
            requested: Mutex::new(None),
            cancel,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Current nickname; empty until the session becomes Active.
    pub fn nickname(&self) -> String {
        self.nickname.read().clone()
    }

    pub(super) fn set_nickname(&self, nick: String) {
        *self.nickname.write() = nick;
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.lock().phase
    }

    pub fn is_active(&self) -> bool {
        self.phase() == Phase::Active
    }

    /// Move from `from` to `to` if the session is still in `from`.
    pub fn advance(&self, from: Phase, to: Phase) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.phase != from {
            return false;
        }
        lifecycle.phase = to;
        true
    }

    /// AwaitingNickname → Active with the given name. Resets liveness.
    ///
    /// Called by the registry inside its critical section.
    pub(super) fn activate(&self, nick: String) -> bool {
        if !self.advance(Phase::AwaitingNickname, Phase::Active) {
            return false;
        }
        self.set_nickname(nick);
        self.touch();
        true
    }

    /// Claim the move into `Closing`.
    ///
    /// Returns the phase the session was in if this call won, `None` if the
    /// session was already closing or closed.
    pub fn begin_close(&self, reason: CloseReason) -> Option<Phase> {
        let mut lifecycle = self.lifecycle.lock();
        if !lifecycle.phase.is_open() {
            return None;
        }
        let previous = lifecycle.phase;
        lifecycle.phase = Phase::Closing;
        lifecycle.reason = Some(reason);
        Some(previous)
    }

    /// Closing → Closed, once the transport has been released.
    pub fn mark_closed(&self) {
        self.advance(Phase::Closing, Phase::Closed);
    }

    /// Reason the session closed, once it has.
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.lifecycle.lock().reason
    }

    // --- liveness ---

    /// Record a liveness reply.
    pub fn touch(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    pub fn last_heartbeat(&self) -> Instant {
        *self.last_heartbeat.lock()
    }

    /// Time since the last liveness reply.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_heartbeat())
    }

    // --- outbound queue ---

    /// Enqueue without waiting.
    pub fn try_send(&self, envelope: Arc<Envelope>) -> Result<(), TrySendError<Arc<Envelope>>> {
        self.outbound.try_send(envelope)
    }

    /// Count a dropped envelope; returns the consecutive drop count.
    pub fn record_overflow(&self) -> u32 {
        self.overflows.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn reset_overflows(&self) {
        self.overflows.store(0, Ordering::Release);
    }

    // --- cancellation ---

    /// Ask the session's own tasks to tear it down with `reason`.
    ///
    /// The first recorded reason sticks. Eviction itself happens on the
    /// connection task, which observes the cancellation.
    pub fn request_close(&self, reason: CloseReason) {
        {
            let mut requested = self.requested.lock();
            if requested.is_none() {
                *requested = Some(reason);
            }
        }
        self.cancel.cancel();
    }

    /// Reason passed to [`request_close`](Self::request_close), if any.
    pub fn requested_close(&self) -> Option<CloseReason> {
        *self.requested.lock()
    }

    /// Wake every task belonging to this session.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the session has been cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::state::SessionIdGenerator;
    use std::sync::OnceLock;

    fn ids() -> &'static SessionIdGenerator {
        static IDS: OnceLock<SessionIdGenerator> = OnceLock::new();
        IDS.get_or_init(SessionIdGenerator::new)
    }

    /// A session awaiting its nickname, with the receiving end of its queue.
    pub(crate) fn detached(capacity: usize) -> (Arc<Session>, mpsc::Receiver<Arc<Envelope>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let addr = SocketAddr::from(([127, 0, 0, 1], 40000));
        let session = Session::new(ids().next(), addr, tx, CancellationToken::new());
        session.advance(Phase::Connecting, Phase::AwaitingNickname);
        (Arc::new(session), rx)
    }
}
