// Connection lifecycle and query execution for the SurrealDB /sql endpoint

mod connection;
mod executor;
mod state;

pub use connection::Connection;
pub use executor::QueryResult;
pub use state::ConnectionState;
