//! Test chat client.
//!
//! Sends raw command lines and decodes the server's JSON envelopes with
//! `ClientCodec`.

use chat_proto::{ClientCodec, Envelope};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};
use tokio_util::codec::Framed;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A test chat client.
pub struct TestClient {
    framed: Framed<TcpStream, ClientCodec>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        Ok(Self {
            framed: Framed::new(stream, ClientCodec::default()),
        })
    }

    /// Send one line.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.framed.send(line.to_string()).await?;
        Ok(())
    }

    /// Send raw bytes, bypassing line termination.
    #[allow(dead_code)]
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.framed.get_mut().write_all(bytes).await?;
        Ok(())
    }

    /// Receive the next envelope, heartbeat probes included.
    #[allow(dead_code)]
    pub async fn recv_raw(&mut self) -> anyhow::Result<Envelope> {
        self.recv_raw_timeout(RECV_TIMEOUT).await
    }

    async fn recv_raw_timeout(&mut self, dur: Duration) -> anyhow::Result<Envelope> {
        match timeout(dur, self.framed.next()).await? {
            Some(Ok(Ok(envelope))) => Ok(envelope),
            Some(Ok(Err(e))) => anyhow::bail!("Undecodable line from server: {e}"),
            Some(Err(e)) => Err(e.into()),
            None => anyhow::bail!("Connection closed"),
        }
    }

    /// Receive the next envelope that isn't a heartbeat probe.
    pub async fn recv(&mut self) -> anyhow::Result<Envelope> {
        loop {
            let envelope = self.recv_raw().await?;
            if !envelope.is_heartbeat() {
                return Ok(envelope);
            }
        }
    }

    /// Receive envelopes until the predicate matches; returns all of them.
    #[allow(dead_code)]
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Envelope>>
    where
        F: FnMut(&Envelope) -> bool,
    {
        let mut envelopes = Vec::new();
        loop {
            let envelope = self.recv().await?;
            let done = predicate(&envelope);
            envelopes.push(envelope);
            if done {
                break;
            }
        }
        Ok(envelopes)
    }

    /// Fail if anything other than a heartbeat arrives within `dur`.
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        let deadline = Instant::now() + dur;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            match timeout(remaining, self.framed.next()).await {
                Err(_) => return Ok(()),
                Ok(Some(Ok(Ok(envelope)))) if envelope.is_heartbeat() => {}
                Ok(Some(Ok(Ok(envelope)))) => {
                    anyhow::bail!("Expected silence, got {envelope:?}")
                }
                Ok(Some(Ok(Err(e)))) => anyhow::bail!("Undecodable line from server: {e}"),
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => anyhow::bail!("Connection closed"),
            }
        }
    }

    /// Wait for the server to close the connection, ignoring anything sent first.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + RECV_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, self.framed.next()).await {
                Err(_) => anyhow::bail!("Connection still open"),
                Ok(None) | Ok(Some(Err(_))) => return Ok(()),
                Ok(Some(Ok(_))) => {}
            }
        }
    }

    /// Consume the greeting, submit `nick`, and wait for the welcome.
    pub async fn register(&mut self, nick: &str) -> anyhow::Result<()> {
        let greeting = self.recv().await?;
        anyhow::ensure!(
            greeting.is_server() && greeting.msg.ends_with("Please enter a nickname:"),
            "Unexpected greeting: {greeting:?}"
        );

        self.send(nick).await?;
        let reply = self.recv().await?;
        let expected = format!("Welcome, {nick}! You are now connected to the chat.");
        anyhow::ensure!(
            reply == Envelope::server(expected),
            "Registration failed: {reply:?}"
        );
        Ok(())
    }
}
