// surq - connection manager and query console for SurrealDB's HTTP endpoint
// Library exports

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
