use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_DNS_PORT: u16 = 53;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Default nameserver as `ip` or `ip:port`. When unset the host's
    /// resolver configuration is consulted.
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Local address to bind. Defaults to the unspecified address of the
    /// server's family with an ephemeral port.
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Extra attempts after the first one times out.
    #[serde(default = "default_retry")]
    pub retry: u32,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Drop responses whose source address differs from the queried server.
    #[serde(default)]
    pub verify_responder: bool,

    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,

    #[serde(default = "default_recv_buffer_size")]
    pub recv_buffer_size: usize,

    #[serde(default = "default_send_buffer_size")]
    pub send_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: None,
            port: default_port(),
            bind_address: None,
            retry: default_retry(),
            timeout_ms: default_timeout_ms(),
            verify_responder: false,
            max_datagram_size: default_max_datagram_size(),
            recv_buffer_size: default_recv_buffer_size(),
            send_buffer_size: default_send_buffer_size(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The configured default server, if any, with `port` applied when the
    /// text carries no port of its own.
    pub fn server_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        self.server
            .as_deref()
            .map(|text| parse_server(text, self.port))
            .transpose()
    }

    pub fn bind_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        self.bind_address
            .as_deref()
            .map(|text| parse_server(text, 0))
            .transpose()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Query timeout must be greater than 0".to_string(),
            ));
        }
        if self.max_datagram_size < 512 {
            return Err(ConfigError::Validation(format!(
                "max_datagram_size {} is below the 512-byte DNS minimum",
                self.max_datagram_size
            )));
        }
        self.server_addr()?;
        self.bind_addr()?;
        Ok(())
    }
}

/// Parses `ip`, `ip:port` or `[v6]:port`.
pub fn parse_server(text: &str, default_port: u16) -> Result<SocketAddr, ConfigError> {
    let text = text.trim();
    if let Ok(addr) = text.parse::<SocketAddr>() {
        return Ok(addr);
    }
    text.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, default_port))
        .map_err(|_| ConfigError::Validation(format!("Invalid server address: {}", text)))
}

fn default_port() -> u16 {
    DEFAULT_DNS_PORT
}

fn default_retry() -> u32 {
    1
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_datagram_size() -> usize {
    4096
}

fn default_recv_buffer_size() -> usize {
    256 * 1024
}

fn default_send_buffer_size() -> usize {
    128 * 1024
}
