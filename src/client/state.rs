// Connection state tracking

use std::fmt;

/// Liveness/auth status of the single tracked connection.
///
/// Transitions happen inside probe(): Connecting while a probe is in flight,
/// then Connected or Disconnected depending on the outcome. A transport
/// failure during query execution also forces Disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No reachable, authenticated endpoint. Initial state.
    Disconnected,
    /// A probe is in flight.
    Connecting,
    /// The endpoint answered an authenticated probe.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting..."),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}
