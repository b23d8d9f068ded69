//! Heartbeat supervisor.
//!
//! One task per Active session. Every probe interval it either sends a
//! SERVER `HEARTBEAT` probe or, if the session has been silent for longer
//! than the timeout, evicts it. The task ends when the session is cancelled
//! or leaves the Active phase.

use chat_proto::Envelope;
use std::sync::Arc;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::state::{CloseReason, Matrix, Session};

/// Liveness timer for a single session.
pub struct HeartbeatSupervisor {
    matrix: Arc<Matrix>,
    session: Arc<Session>,
    probe_interval: Duration,
    timeout: Duration,
}

impl HeartbeatSupervisor {
    pub fn new(matrix: Arc<Matrix>, session: Arc<Session>) -> Self {
        let probe_interval = matrix.config.heartbeat.probe_interval();
        let timeout = matrix.config.heartbeat.timeout();
        Self {
            matrix,
            session,
            probe_interval,
            timeout,
        }
    }

    pub async fn run(self) {
        let probe = Arc::new(Envelope::heartbeat());
        let mut ticker = interval_at(Instant::now() + self.probe_interval, self.probe_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.session.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if self.session.is_cancelled() || !self.session.is_active() {
                break;
            }

            let idle = self.session.idle_for(Instant::now());
            if idle > self.timeout {
                info!(
                    sid = %self.session.id(),
                    nick = %self.session.nickname(),
                    idle_secs = idle.as_secs(),
                    "Heartbeat timeout"
                );
                self.matrix.evict(&self.session, CloseReason::HeartbeatTimeout);
                break;
            }

            self.matrix.router.deliver(&self.session, Arc::clone(&probe));
            debug!(sid = %self.session.id(), "Heartbeat probe sent");
        }
    }
}
