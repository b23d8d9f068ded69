//! Test server management.
//!
//! Spawns and manages chatd instances for integration testing.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    // Held so the config file outlives the process.
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server with the default heartbeat timing.
    #[allow(dead_code)]
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with("").await
    }

    /// Spawn a server, appending `extra` TOML sections to the base config.
    pub async fn spawn_with(extra: &str) -> anyhow::Result<Self> {
        let port = free_port()?;
        let data_dir = tempfile::tempdir()?;

        let config_path = data_dir.path().join("chatd.toml");
        let config_content = format!(
            r#"
[server]
name = "test-chat"

[listen]
address = "127.0.0.1:{port}"

{extra}
"#
        );
        std::fs::write(&config_path, config_content)?;

        let binary_path = PathBuf::from(env!("CARGO_BIN_EXE_chatd"));
        let child = Command::new(&binary_path)
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };

        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Spawn a server with short heartbeat timing.
    #[allow(dead_code)]
    pub async fn spawn_fast_heartbeat() -> anyhow::Result<Self> {
        Self::spawn_with(
            r#"
[heartbeat]
probe_interval_secs = 1
timeout_secs = 2
"#,
        )
        .await
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if let Ok(stream) = tokio::net::TcpStream::connect(("127.0.0.1", self.port)).await {
                drop(stream);
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Connect a client without registering.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }

    /// Connect a client and register it under `nick`.
    pub async fn join(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect().await?;
        client.register(nick).await?;
        Ok(client)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Ask the OS for a port nobody is listening on.
fn free_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
