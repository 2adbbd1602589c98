pub mod client;
pub mod errors;
pub mod logging;
pub mod root;

pub use client::ClientConfig;
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
