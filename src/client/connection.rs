// Connection lifecycle management
//
// Owns the observable connection state for a single SurrealDB endpoint and
// drives the authenticated liveness probe. Failures never propagate to the
// caller; they are recorded as state so the surrounding UI can render them.

use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigResolver, ConnectionConfig};
use crate::error::Error;

use super::state::ConnectionState;

/// Upper bound for any request on the shared client.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tighter bound for the liveness probe. A probe that takes longer than this
/// is treated the same as an unreachable endpoint.
const PROBE_TIMEOUT_SECS: u64 = 5;

/// Cadence of the background reconnect task.
const RECONNECT_INTERVAL_SECS: u64 = 10;

/// A connection to a SurrealDB HTTP query endpoint.
///
/// Cloning is cheap and all clones observe the same state. Constructed with
/// a ConfigResolver so that settings are re-read for every operation.
#[derive(Clone)]
pub struct Connection {
    pub(super) inner: Arc<ConnectionInner>,
}

pub(super) struct ConnectionInner {
    pub(super) http: Client,
    pub(super) resolver: ConfigResolver,
    state: RwLock<ConnectionState>,
    last_error: RwLock<Option<Error>>,
    probe_lock: tokio::sync::Mutex<()>,
    reconnect: Mutex<Option<ReconnectTask>>,
}

struct ReconnectTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Connection {
    /// Create a new connection in the Disconnected state.
    pub fn new(resolver: ConfigResolver) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            inner: Arc::new(ConnectionInner {
                http,
                resolver,
                state: RwLock::new(ConnectionState::Disconnected),
                last_error: RwLock::new(None),
                probe_lock: tokio::sync::Mutex::new(()),
                reconnect: Mutex::new(None),
            }),
        })
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.read().unwrap()
    }

    /// Whether the last probe left the connection usable.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// The failure recorded by the most recent probe or query transport
    /// error, if the connection is not healthy.
    pub fn last_error(&self) -> Option<Error> {
        self.inner.last_error.read().unwrap().clone()
    }

    /// Verify that the endpoint is reachable and the credentials work.
    ///
    /// Issues one authenticated no-op query against the endpoint and updates
    /// the observable state with the classified outcome. If another probe is
    /// already in flight this call issues no request of its own; it waits
    /// for the in-flight probe to finish and adopts its outcome.
    pub async fn probe(&self) {
        let _guard = match self.inner.probe_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let _wait = self.inner.probe_lock.lock().await;
                return;
            }
        };

        let config = self.inner.resolver.resolve();
        self.set_state(ConnectionState::Connecting);
        tracing::debug!(endpoint = %config.endpoint(), "probing SurrealDB");

        let body = format!("{} INFO FOR DB;", config.context_prelude());
        let response = self
            .sql_request(&config, body)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                self.mark_connected();
                tracing::info!(endpoint = %config.endpoint(), "connected to SurrealDB");
            }
            Ok(response) => {
                let status = response.status();
                let error = if status == StatusCode::FORBIDDEN {
                    Error::AuthenticationFailed {
                        user: config.username.clone(),
                    }
                } else {
                    let detail = response_detail(status, response.text().await.ok());
                    Error::ConnectionFailed {
                        status: status.as_u16(),
                        detail,
                    }
                };
                tracing::debug!(error = %error, "probe rejected");
                self.mark_disconnected(error);
            }
            Err(e) => {
                tracing::debug!(error = %e, "probe transport failure");
                self.mark_disconnected(Error::Unreachable {
                    addr: config.addr(),
                });
            }
        }
    }

    /// Start the background task that probes every ten seconds while the
    /// connection is down. Starting again replaces the previous task.
    pub fn start_reconnect_task(&self) {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let weak = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(RECONNECT_INTERVAL_SECS));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let Some(connection) = Weak::upgrade(&weak).map(|inner| Connection { inner }) else {
                            break;
                        };
                        if !connection.is_connected() {
                            connection.probe().await;
                        }
                    }
                }
            }

            tracing::debug!("reconnect task stopped");
        });

        let mut slot = self.inner.reconnect.lock().unwrap();
        if let Some(previous) = slot.replace(ReconnectTask { cancel, handle }) {
            previous.cancel.cancel();
        }
    }

    /// Stop the reconnect task, if one is running.
    pub fn shutdown(&self) {
        if let Some(task) = self.inner.reconnect.lock().unwrap().take() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }

    /// Build an authenticated request against the /sql endpoint.
    pub(super) fn sql_request(
        &self,
        config: &ConnectionConfig,
        body: String,
    ) -> reqwest::RequestBuilder {
        self.inner
            .http
            .post(config.endpoint())
            .basic_auth(&config.username, Some(&config.password))
            .header("Content-Type", "text/plain")
            .header("Accept", "application/json")
            .body(body)
    }

    fn set_state(&self, state: ConnectionState) {
        *self.inner.state.write().unwrap() = state;
    }

    fn mark_connected(&self) {
        self.set_state(ConnectionState::Connected);
        *self.inner.last_error.write().unwrap() = None;
    }

    /// Record a failure and drop back to Disconnected. Also used by the
    /// executor when a query hits a transport failure.
    pub(super) fn mark_disconnected(&self, error: Error) {
        self.set_state(ConnectionState::Disconnected);
        *self.inner.last_error.write().unwrap() = Some(error);
    }
}

impl Drop for ConnectionInner {
    fn drop(&mut self) {
        if let Ok(slot) = self.reconnect.get_mut() {
            if let Some(task) = slot.take() {
                task.cancel.cancel();
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state())
            .field("last_error", &self.last_error())
            .finish()
    }
}

/// Response body for an error message, or the canonical status text when the
/// body is empty or unreadable.
pub(super) fn response_detail(status: StatusCode, body: Option<String>) -> String {
    match body {
        Some(body) if !body.is_empty() => body,
        _ => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_starts_disconnected() {
        let connection = Connection::new(ConfigResolver::with_path("/nonexistent")).unwrap();
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(connection.last_error().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let connection = Connection::new(ConfigResolver::with_path("/nonexistent")).unwrap();
        let other = connection.clone();

        connection.mark_disconnected(Error::ConnectionLost);
        assert_eq!(other.last_error(), Some(Error::ConnectionLost));
    }

    #[test]
    fn test_response_detail_falls_back_to_status_text() {
        assert_eq!(
            response_detail(StatusCode::INTERNAL_SERVER_ERROR, Some(String::new())),
            "Internal Server Error"
        );
        assert_eq!(
            response_detail(StatusCode::BAD_REQUEST, Some("boom".to_string())),
            "boom"
        );
    }
}
