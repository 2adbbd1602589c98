use std::net::SocketAddr;
use std::time::Duration;

/// Per-query overrides. Unset fields fall back to the client's configured
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Destination for this query instead of the default server.
    pub server: Option<SocketAddr>,
    /// Extra attempts after the first one times out. `Some(0)` disables
    /// retrying.
    pub retry: Option<u32>,
    /// Timeout of each attempt.
    pub timeout: Option<Duration>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, server: SocketAddr) -> Self {
        self.server = Some(server);
        self
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }
}
