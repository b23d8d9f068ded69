//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task and owns two halves:
//!
//! ```text
//!    ┌──────────────────────────────────────────────────────────┐
//!    │                    Connection Task                       │
//!    │                                                          │
//!    │  FramedRead<ServerCodec>          FramedWrite<ServerCodec>│
//!    │        │ lines                           ▲ envelopes     │
//!    │        ▼                                 │               │
//!    │  negotiation / Dispatcher ──▶ Router ──▶ mpsc queue      │
//!    │        ▲                                 (writer task)   │
//!    │        └── session.cancelled() ◀── evict / shutdown      │
//!    └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The reader decides why the session ended; `Matrix::evict` then runs at
//! most once no matter how many paths race to close it.

mod error_handling;

use error_handling::{ReadErrorAction, classify_read_error};

use crate::handlers::{
    Context, Dispatcher, HandlerError, Negotiation, send_greeting, submit_nickname,
};
use crate::network::HeartbeatSupervisor;
use crate::state::{CloseReason, Matrix, Phase, Session};
use chat_proto::{Envelope, Frame, ProtocolError, ServerCodec};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, info, instrument, warn};

/// How long the writer may spend flushing queued envelopes after close.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

type LineReader = FramedRead<OwnedReadHalf, ServerCodec>;
type EnvelopeWriter = FramedWrite<OwnedWriteHalf, ServerCodec>;

/// A client connection handler.
pub struct Connection {
    session: Arc<Session>,
    outbound: mpsc::Receiver<Arc<Envelope>>,
    stream: TcpStream,
    matrix: Arc<Matrix>,
    dispatcher: Arc<Dispatcher>,
}

impl Connection {
    /// Open a session for an accepted stream.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let (session, outbound) = matrix.open_session(addr);
        Self {
            session,
            outbound,
            stream,
            matrix,
            dispatcher,
        }
    }

    /// Run the connection until the client leaves or the session is evicted.
    #[instrument(
        skip(self),
        fields(sid = %self.session.id(), addr = %self.session.addr()),
        name = "connection"
    )]
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            session,
            outbound,
            stream,
            matrix,
            dispatcher,
        } = self;

        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        let (read_half, write_half) = stream.into_split();
        let reader = FramedRead::new(
            read_half,
            ServerCodec::with_max_len(matrix.config.limits.max_line_len),
        );
        let writer = FramedWrite::new(write_half, ServerCodec::default());

        let writer_task = tokio::spawn(
            write_loop(writer, outbound, Arc::clone(&session)).in_current_span(),
        );

        send_greeting(&matrix, &session);

        let reason = read_loop(reader, &session, &matrix, &dispatcher).await;
        matrix.evict(&session, reason);

        if let Err(e) = writer_task.await {
            warn!(error = %e, "Writer task failed");
        }
        session.mark_closed();

        info!(reason = reason.as_str(), "Connection closed");
        Ok(())
    }
}

/// Read lines until the session should end, and say why.
async fn read_loop(
    mut reader: LineReader,
    session: &Arc<Session>,
    matrix: &Arc<Matrix>,
    dispatcher: &Dispatcher,
) -> CloseReason {
    let negotiation_deadline = Instant::now() + matrix.config.limits.negotiation_timeout();

    loop {
        let frame: Frame<String> = tokio::select! {
            biased;

            _ = session.cancelled() => {
                return match session.requested_close().or_else(|| session.close_reason()) {
                    Some(reason) => reason,
                    None if matrix.is_shutting_down() => CloseReason::ServerShutdown,
                    None => CloseReason::TransportError,
                };
            }

            _ = sleep_until(negotiation_deadline), if session.phase() == Phase::AwaitingNickname => {
                info!("Nickname negotiation timed out");
                return CloseReason::NegotiationTimeout;
            }

            next = reader.next() => match next {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    debug!(error = %e, "Read error");
                    return CloseReason::TransportError;
                }
                None => return CloseReason::Eof,
            },
        };

        let line = match frame {
            Ok(line) => line,
            Err(e) => match classify_read_error(&e) {
                ReadErrorAction::InputTooLong => {
                    warn!(error = %e, "Input line too long");
                    matrix.router.reply(session, "Input line too long");
                    continue;
                }
                ReadErrorAction::Skip => {
                    warn!(error = %e, "Dropped unreadable line");
                    continue;
                }
                ReadErrorAction::IoError => {
                    debug!(error = %e, "Read error");
                    return CloseReason::TransportError;
                }
            },
        };

        match session.phase() {
            Phase::AwaitingNickname => match submit_nickname(matrix, session, &line) {
                Negotiation::Registered => {
                    let supervisor =
                        HeartbeatSupervisor::new(Arc::clone(matrix), Arc::clone(session));
                    tokio::spawn(supervisor.run().in_current_span());
                }
                Negotiation::Quit => return CloseReason::Quit,
                Negotiation::Ignored | Negotiation::Retry => {}
            },
            Phase::Active => {
                let mut ctx = Context::new(session, matrix);
                match dispatcher.dispatch(&mut ctx, &line).await {
                    Ok(()) => {}
                    Err(HandlerError::Quit) => return CloseReason::Quit,
                    Err(e) => {
                        if let Some(reply) = e.to_reply() {
                            matrix.router.deliver(session, Arc::new(reply));
                        }
                    }
                }
            }
            // Closing: the cancellation branch picks this up on the next turn.
            Phase::Connecting | Phase::Closing | Phase::Closed => {}
        }
    }
}

/// Drain the outbound queue onto the socket.
///
/// Envelopes are fed in batches and flushed once the queue is momentarily
/// empty. Every batch races the session's cancellation, so a peer that stops
/// reading cannot pin the task. After cancellation whatever is still queued
/// gets a bounded grace period to reach the client.
async fn write_loop(
    mut writer: EnvelopeWriter,
    mut outbound: mpsc::Receiver<Arc<Envelope>>,
    session: Arc<Session>,
) {
    loop {
        let envelope = tokio::select! {
            biased;
            next = outbound.recv() => match next {
                Some(envelope) => envelope,
                None => break,
            },
            _ = session.cancelled() => break,
        };

        let written = tokio::select! {
            biased;
            result = write_batch(&mut writer, &mut outbound, envelope) => result,
            _ = session.cancelled() => break,
        };
        if let Err(e) = written {
            warn!(error = %e, "Write failed");
            session.request_close(CloseReason::TransportError);
            return;
        }
    }

    let drain = async {
        while let Ok(envelope) = outbound.try_recv() {
            writer.feed(envelope.as_ref()).await?;
        }
        SinkExt::<&Envelope>::flush(&mut writer).await?;
        SinkExt::<&Envelope>::close(&mut writer).await
    };
    match tokio::time::timeout(DRAIN_GRACE, drain).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Final flush failed"),
        Err(_) => debug!("Final flush timed out"),
    }
}

/// Feed `first` plus whatever else is already queued, then flush.
async fn write_batch(
    writer: &mut EnvelopeWriter,
    outbound: &mut mpsc::Receiver<Arc<Envelope>>,
    first: Arc<Envelope>,
) -> Result<(), ProtocolError> {
    writer.feed(first.as_ref()).await?;
    while let Ok(envelope) = outbound.try_recv() {
        writer.feed(envelope.as_ref()).await?;
    }
    SinkExt::<&Envelope>::flush(writer).await
}
