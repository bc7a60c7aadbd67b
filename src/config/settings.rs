// Connection settings
//
// A ConnectionConfig is an immutable snapshot of the parameters needed for
// one probe or one query. It is re-read from disk for every operation, so a
// settings change takes effect on the next request without a restart.

use serde::{Deserialize, Serialize};

/// Default host for a local SurrealDB instance.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port the database container maps the HTTP endpoint to.
pub const DEFAULT_PORT: &str = "8001";

/// Default root credentials of a development instance.
pub const DEFAULT_USERNAME: &str = "root";
pub const DEFAULT_PASSWORD: &str = "root";

/// Default namespace and database selected before every statement.
pub const DEFAULT_NAMESPACE: &str = "test";
pub const DEFAULT_DATABASE: &str = "test";

/// Parameters for one connection to a SurrealDB HTTP endpoint.
///
/// The port is kept as a string: it is only ever interpolated into a URL,
/// and the settings file stores all six fields as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_database")]
    pub database: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> String {
    DEFAULT_PORT.to_string()
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: default_password(),
            namespace: default_namespace(),
            database: default_database(),
        }
    }
}

impl ConnectionConfig {
    /// Full URL of the query endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/sql", self.host, self.port)
    }

    /// Host and port, for error messages.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Statements that switch execution context to the configured namespace
    /// and database. Prefixed to every request body.
    pub fn context_prelude(&self) -> String {
        format!("USE NS {}; USE DB {};", self.namespace, self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, "8001");
        assert_eq!(config.username, "root");
        assert_eq!(config.password, "root");
        assert_eq!(config.namespace, "test");
        assert_eq!(config.database, "test");
    }

    #[test]
    fn test_endpoint_url() {
        let config = ConnectionConfig::default();
        assert_eq!(config.endpoint(), "http://localhost:8001/sql");
    }

    #[test]
    fn test_context_prelude() {
        let config = ConnectionConfig {
            namespace: "prod".to_string(),
            database: "inventory".to_string(),
            ..ConnectionConfig::default()
        };
        assert_eq!(config.context_prelude(), "USE NS prod; USE DB inventory;");
    }

    #[test]
    fn test_partial_settings_fill_with_defaults() {
        let config: ConnectionConfig = toml::from_str("host = \"db.internal\"").unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, "8001");
        assert_eq!(config.namespace, "test");
    }
}
