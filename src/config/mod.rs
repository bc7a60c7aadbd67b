// Configuration module
// Public interface for settings resolution

mod resolver;
mod settings;

pub use resolver::ConfigResolver;
pub use settings::{
    ConnectionConfig, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_NAMESPACE, DEFAULT_PASSWORD,
    DEFAULT_PORT, DEFAULT_USERNAME,
};
