// Integration tests for the connection lifecycle
//
// Each test points the resolver at a settings file naming a local mock
// endpoint, so the full path from settings to classified probe outcome is
// exercised.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use mockito::Matcher;
use tempfile::TempDir;

use surq::client::{Connection, ConnectionState};
use surq::config::ConfigResolver;
use surq::error::Error;

const PROBE_BODY: &str = "USE NS test; USE DB test; INFO FOR DB;";
const ROOT_BASIC_AUTH: &str = "Basic cm9vdDpyb290";

/// Write a settings file pointing at the given host:port address.
fn settings_for(addr: &str) -> (TempDir, ConfigResolver) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    write_settings(&path, addr);
    (dir, ConfigResolver::with_path(path))
}

fn write_settings(path: &PathBuf, addr: &str) {
    let (host, port) = addr.split_once(':').unwrap();
    fs::write(path, format!("host = \"{}\"\nport = \"{}\"\n", host, port)).unwrap();
}

/// An address nothing is listening on.
fn unreachable_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_probe_success_transitions_to_connected() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/sql")
        .match_header("authorization", ROOT_BASIC_AUTH)
        .match_header("content-type", "text/plain")
        .match_header("accept", "application/json")
        .match_body(Matcher::Exact(PROBE_BODY.to_string()))
        .with_status(200)
        .with_body(r#"[{"result":{"tables":{}},"status":"OK","time":"1ms"}]"#)
        .create_async()
        .await;

    let (_dir, resolver) = settings_for(&server.host_with_port());
    let connection = Connection::new(resolver).unwrap();

    connection.probe().await;

    assert_eq!(connection.state(), ConnectionState::Connected);
    assert!(connection.last_error().is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_probe_unreachable_endpoint() {
    let addr = unreachable_addr();
    let (_dir, resolver) = settings_for(&addr);
    let connection = Connection::new(resolver).unwrap();

    connection.probe().await;

    assert_eq!(connection.state(), ConnectionState::Disconnected);
    let error = connection.last_error().unwrap();
    assert_eq!(error, Error::Unreachable { addr: addr.clone() });
    assert!(error.to_string().contains("Is it running?"));
}

#[tokio::test]
async fn test_probe_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/sql")
        .match_body(Matcher::Exact(PROBE_BODY.to_string()))
        .with_status(403)
        .with_body("Forbidden")
        .create_async()
        .await;

    let (_dir, resolver) = settings_for(&server.host_with_port());
    let connection = Connection::new(resolver).unwrap();

    connection.probe().await;

    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert_eq!(
        connection.last_error(),
        Some(Error::AuthenticationFailed {
            user: "root".to_string()
        })
    );
}

#[tokio::test]
async fn test_probe_server_error_records_status_and_detail() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/sql")
        .match_body(Matcher::Exact(PROBE_BODY.to_string()))
        .with_status(500)
        .with_body("There was a problem with the database")
        .create_async()
        .await;

    let (_dir, resolver) = settings_for(&server.host_with_port());
    let connection = Connection::new(resolver).unwrap();

    connection.probe().await;

    assert_eq!(connection.state(), ConnectionState::Disconnected);
    let error = connection.last_error().unwrap();
    assert_eq!(
        error,
        Error::ConnectionFailed {
            status: 500,
            detail: "There was a problem with the database".to_string()
        }
    );
    assert!(error.to_string().starts_with("Connection failed: 500"));
}

#[tokio::test]
async fn test_probe_success_clears_previous_error() {
    let mut rejecting = mockito::Server::new_async().await;
    let _rejected = rejecting
        .mock("POST", "/sql")
        .match_body(Matcher::Exact(PROBE_BODY.to_string()))
        .with_status(403)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    write_settings(&path, &rejecting.host_with_port());

    let connection = Connection::new(ConfigResolver::with_path(&path)).unwrap();
    connection.probe().await;
    assert!(connection.last_error().is_some());

    // Settings are re-read per probe; repoint them at a healthy endpoint.
    let mut accepting = mockito::Server::new_async().await;
    let _accepted = accepting
        .mock("POST", "/sql")
        .match_body(Matcher::Exact(PROBE_BODY.to_string()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    write_settings(&path, &accepting.host_with_port());

    connection.probe().await;
    assert_eq!(connection.state(), ConnectionState::Connected);
    assert!(connection.last_error().is_none());
}

#[tokio::test]
async fn test_concurrent_probes_share_one_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/sql")
        .match_body(Matcher::Exact(PROBE_BODY.to_string()))
        .with_chunked_body(|writer| {
            // Hold the response open long enough for the second probe to
            // arrive while the first is still in flight.
            std::thread::sleep(Duration::from_millis(200));
            writer.write_all(br#"[{"result":{},"status":"OK","time":"1ms"}]"#)
        })
        .expect(1)
        .create_async()
        .await;

    let (_dir, resolver) = settings_for(&server.host_with_port());
    let connection = Connection::new(resolver).unwrap();

    tokio::join!(connection.probe(), connection.probe());

    assert_eq!(connection.state(), ConnectionState::Connected);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_reconnect_task_probes_on_start_and_stops_on_shutdown() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/sql")
        .match_body(Matcher::Exact(PROBE_BODY.to_string()))
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let (_dir, resolver) = settings_for(&server.host_with_port());
    let connection = Connection::new(resolver).unwrap();

    connection.start_reconnect_task();

    // The first tick fires immediately; give it a moment to finish.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(connection.state(), ConnectionState::Connected);
    mock.assert_async().await;

    connection.shutdown();
}
