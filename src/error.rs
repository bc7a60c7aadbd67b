// Error taxonomy for connection probing and query execution
//
// Every failure of probe() or execute() is converted into one of these
// variants and surfaced through connection state or the query result.
// None of them propagate as faults past those operations.

use thiserror::Error;

/// Classified failures of the connection manager and query executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The query text was empty after trimming. Never reaches the network.
    #[error("Query is empty")]
    EmptyQuery,

    /// A query was attempted while disconnected and the forced probe did not
    /// recover the connection. Carries the probe's recorded cause.
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// The endpoint answered HTTP 403.
    #[error("Authentication failed. Check credentials for user \"{user}\"")]
    AuthenticationFailed { user: String },

    /// Transport-level failure while probing. The endpoint could not be
    /// reached at all.
    #[error("Cannot reach SurrealDB at {addr}. Is it running?")]
    Unreachable { addr: String },

    /// Transport-level failure while executing a query on a connection that
    /// was believed healthy.
    #[error("Connection lost")]
    ConnectionLost,

    /// The probe got a non-success response other than 403.
    #[error("Connection failed: {status}: {detail}")]
    ConnectionFailed { status: u16, detail: String },

    /// A query got a non-success response other than 403.
    #[error("{status}: {detail}")]
    Query { status: u16, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_message_names_the_address() {
        let error = Error::Unreachable {
            addr: "localhost:8001".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot reach SurrealDB at localhost:8001. Is it running?"
        );
    }

    #[test]
    fn test_authentication_message_carries_credential_hint() {
        let error = Error::AuthenticationFailed {
            user: "root".to_string(),
        };
        assert!(error.to_string().contains("root"));
        assert!(error.to_string().starts_with("Authentication failed"));
    }

    #[test]
    fn test_query_error_message_leads_with_status() {
        let error = Error::Query {
            status: 500,
            detail: "There was a problem with the database".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "500: There was a problem with the database"
        );
    }

    #[test]
    fn test_connection_lost_is_a_fixed_message() {
        assert_eq!(Error::ConnectionLost.to_string(), "Connection lost");
    }
}
