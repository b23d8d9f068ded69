//! Integration tests for messaging between Active sessions.

mod common;

use chat_proto::Envelope;
use common::{TestClient, TestServer};
use std::time::Duration;

const QUIET: Duration = Duration::from_millis(300);

/// Register `nicks` in order and drain every join notice.
async fn room(server: &TestServer, nicks: &[&str]) -> Vec<TestClient> {
    let mut clients: Vec<TestClient> = Vec::new();
    for nick in nicks {
        let client = server.join(nick).await.expect("registration failed");
        for earlier in clients.iter_mut() {
            let notice = earlier.recv().await.unwrap();
            assert_eq!(notice, Envelope::new(*nick, "has joined the chat."));
        }
        clients.push(client);
    }
    clients
}

#[tokio::test]
async fn test_broadcast_excludes_sender() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut clients = room(&server, &["alice", "bob", "carol"]).await;

    clients[0].send("hello everyone").await.unwrap();

    let expected = Envelope::new("alice", "hello everyone");
    assert_eq!(clients[1].recv().await.unwrap(), expected);
    assert_eq!(clients[2].recv().await.unwrap(), expected);
    clients[0].expect_silence(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_private_message_reaches_only_target() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut clients = room(&server, &["alice", "bob", "carol"]).await;

    clients[0].send("MSG bob meet at noon").await.unwrap();
    assert_eq!(
        clients[1].recv().await.unwrap(),
        Envelope::new("alice (private)", "meet at noon")
    );
    clients[2].expect_silence(QUIET).await.unwrap();

    clients[0].send("MSG zed hello?").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("User zed not found")
    );
}

#[tokio::test]
async fn test_list_names_every_active_session() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut clients = room(&server, &["bob", "alice"]).await;

    // Still negotiating; must not be listed.
    let mut pending = server.connect().await.unwrap();
    pending.recv().await.unwrap();

    clients[0].send("LST").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("alice, bob")
    );
}

#[tokio::test]
async fn test_nick_change_and_collision() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut clients = room(&server, &["alice", "bob"]).await;

    clients[0].send("NICK bob").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("That name is already taken.")
    );

    clients[0].send("NICK ally").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("Nickname set to ally")
    );

    clients[1].send("MSG ally psst").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::new("bob (private)", "psst")
    );
}

#[tokio::test]
async fn test_malformed_commands_get_usage() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut clients = room(&server, &["alice", "bob"]).await;

    clients[0].send("NICK").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("Usage: NICK <nickname>")
    );

    clients[0].send("MSG bob").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("Usage: MSG <nickname> <message>")
    );

    clients[0].send("LST please").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("Usage: LST")
    );

    // Nothing reached bob, and alice is still connected.
    clients[1].expect_silence(QUIET).await.unwrap();
    clients[0].send("LST").await.unwrap();
    assert_eq!(
        clients[0].recv().await.unwrap(),
        Envelope::server("alice, bob")
    );
}

#[tokio::test]
async fn test_ping_and_help() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut clients = room(&server, &["alice"]).await;

    clients[0].send("PING").await.unwrap();
    assert_eq!(clients[0].recv().await.unwrap(), Envelope::server("PONG"));
    let timing = clients[0].recv().await.unwrap();
    assert!(timing.is_server());
    assert!(timing.msg.starts_with("Ping: ") && timing.msg.ends_with(" ms"));

    clients[0].send("HELP").await.unwrap();
    let help = clients[0].recv().await.unwrap();
    assert!(help.is_server());
    for command in ["NICK", "MSG", "LST", "PING", "QUIT"] {
        assert!(help.msg.contains(command), "HELP does not mention {command}");
    }
}
