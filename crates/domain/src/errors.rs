use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Malformed DNS packet: {0}")]
    MalformedPacket(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid resource record: {0}")]
    InvalidRecord(String),

    #[error("Failed to send DNS query to {server}: {source}")]
    Transport {
        server: String,
        #[source]
        source: Arc<io::Error>,
    },

    #[error(
        "ETIMEDOUT: DNS query timed out after {attempts} trials each with {timeout_ms}ms timeout"
    )]
    Timeout { attempts: u32, timeout_ms: u64 },

    #[error("Fatal transport error: {0}")]
    FatalTransport(#[source] Arc<io::Error>),

    #[error("DNS client is closed")]
    Closed,

    #[error("Query id {0} was reissued before the query completed")]
    IdReused(u16),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn transport(server: impl ToString, source: io::Error) -> Self {
        DomainError::Transport {
            server: server.to_string(),
            source: Arc::new(source),
        }
    }

    pub fn fatal(source: io::Error) -> Self {
        DomainError::FatalTransport(Arc::new(source))
    }

    /// `true` for the `ETIMEDOUT`-equivalent error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DomainError::Timeout { .. })
    }

    /// Total time spent waiting across every attempt of a timed-out query.
    pub fn elapsed_ms(&self) -> Option<u64> {
        match self {
            DomainError::Timeout {
                attempts,
                timeout_ms,
            } => Some(u64::from(*attempts) * timeout_ms),
            _ => None,
        }
    }
}
