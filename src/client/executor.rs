// Query execution
//
// Submits one query string against the /sql endpoint and reports a timed,
// classified result. Execution never schedules its own retries; a failed
// result is handed back and the caller decides whether to reconnect.

use std::time::Instant;

use reqwest::StatusCode;
use serde_json::Value;

use super::connection::{response_detail, Connection};
use super::state::ConnectionState;
use crate::error::Error;

/// Outcome of one execution attempt.
///
/// Exactly one of payload and error is set once the attempt completes;
/// execution_time_ms is only set on success.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub payload: Option<Value>,
    pub execution_time_ms: Option<f64>,
    pub error: Option<Error>,
}

impl QueryResult {
    fn success(payload: Value, execution_time_ms: f64) -> Self {
        Self {
            payload: Some(payload),
            execution_time_ms: Some(execution_time_ms),
            error: None,
        }
    }

    fn failure(error: Error) -> Self {
        Self {
            payload: None,
            execution_time_ms: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl Connection {
    /// Execute one query against the configured namespace and database.
    ///
    /// The query text is sent verbatim after the context prelude; its
    /// content is opaque here and not validated. If the connection is down,
    /// one probe is forced first; when that fails the query is abandoned
    /// without a network call. All failures come back inside the result,
    /// never as a fault.
    pub async fn execute(&self, query: &str) -> QueryResult {
        let query = query.trim();
        if query.is_empty() {
            return QueryResult::failure(Error::EmptyQuery);
        }

        if self.state() != ConnectionState::Connected {
            self.probe().await;
            if self.state() != ConnectionState::Connected {
                let cause = self
                    .last_error()
                    .map(|error| error.to_string())
                    .unwrap_or_else(|| "no connection established".to_string());
                return QueryResult::failure(Error::NotConnected(cause));
            }
        }

        let config = self.inner.resolver.resolve();
        let body = format!("{} {}", config.context_prelude(), query);
        tracing::debug!(endpoint = %config.endpoint(), "executing query");

        let started = Instant::now();

        let response = match self.sql_request(&config, body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "transport failure during query");
                self.mark_disconnected(Error::ConnectionLost);
                return QueryResult::failure(Error::ConnectionLost);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error = if status == StatusCode::FORBIDDEN {
                Error::AuthenticationFailed {
                    user: config.username.clone(),
                }
            } else {
                let detail = response_detail(status, response.text().await.ok());
                Error::Query {
                    status: status.as_u16(),
                    detail,
                }
            };
            tracing::debug!(error = %error, "query rejected");
            return QueryResult::failure(error);
        }

        // The timing window closes once the body has been fully received,
        // before parsing.
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "connection dropped mid-response");
                self.mark_disconnected(Error::ConnectionLost);
                return QueryResult::failure(Error::ConnectionLost);
            }
        };
        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        match serde_json::from_slice(&bytes) {
            Ok(payload) => {
                tracing::debug!(execution_time_ms, "query completed");
                QueryResult::success(payload, execution_time_ms)
            }
            Err(e) => QueryResult::failure(Error::Query {
                status: status.as_u16(),
                detail: format!("invalid JSON in response body: {}", e),
            }),
        }
    }
}
