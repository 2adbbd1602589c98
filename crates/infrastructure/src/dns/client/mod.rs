//! Asynchronous DNS-over-UDP client.
//!
//! A `DnsClient` is a handle to a dispatcher task that owns the socket. Each
//! `send` assigns the next transaction id, transmits the request, retries on
//! timeout and settles exactly once with the matching response or an error.

mod dispatcher;
mod options;
mod query;

pub use options::SendOptions;

use crate::dns::transport::{DatagramTransport, UdpTransport};
use crate::system::resolv_conf;
use dispatcher::{Command, Dispatcher, DispatcherSettings};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::info;
use wiredns_domain::{ClientConfig, DomainError, Message};

pub struct DnsClient {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
    pending: Arc<AtomicUsize>,
    default_server: Option<SocketAddr>,
    local_addr: Option<SocketAddr>,
}

impl DnsClient {
    /// Binds a UDP socket and starts the dispatcher.
    ///
    /// The default server comes from `config.server`, else from the host's
    /// `/etc/resolv.conf`. A client without a default server can still send
    /// queries that name one in their `SendOptions`.
    pub async fn bind(config: &ClientConfig) -> Result<Self, DomainError> {
        let configured = config
            .server_addr()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        let default_server = match configured {
            Some(addr) => Some(addr),
            None => resolv_conf::system_nameserver(config.port).await,
        };

        let local = config
            .bind_addr()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?
            .unwrap_or_else(|| UdpTransport::unspecified_for(default_server));

        let transport = UdpTransport::bind(
            local,
            config.recv_buffer_size,
            config.send_buffer_size,
        )
        .map_err(|e| DomainError::transport(local, e))?;

        let client = Self::with_transport(Arc::new(transport), config, default_server);
        info!(
            local = ?client.local_addr,
            server = ?client.default_server,
            "DNS client bound"
        );
        Ok(client)
    }

    /// Starts a dispatcher over an existing transport. Must be called from
    /// within a tokio runtime.
    pub fn with_transport(
        transport: Arc<dyn DatagramTransport>,
        config: &ClientConfig,
        default_server: Option<SocketAddr>,
    ) -> Self {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let pending = Arc::new(AtomicUsize::new(0));
        let local_addr = transport.local_addr().ok();

        let settings = DispatcherSettings {
            default_server,
            retry: config.retry,
            timeout: config.timeout(),
            verify_responder: config.verify_responder,
            max_datagram_size: config.max_datagram_size,
        };
        let dispatcher = Dispatcher::new(
            transport,
            settings,
            commands_rx,
            shutdown.clone(),
            pending.clone(),
        );
        tokio::spawn(dispatcher.run());

        Self {
            commands,
            shutdown,
            pending,
            default_server,
            local_addr,
        }
    }

    /// Sends `message` and waits for the response with the same id.
    ///
    /// The message's id is replaced with the next id from the client's
    /// counter. Fails with `Timeout` once every attempt has timed out,
    /// `Transport` if a send fails, `FatalTransport` if the socket breaks and
    /// `Closed` after `close`.
    pub async fn send(
        &self,
        message: Message,
        options: SendOptions,
    ) -> Result<Message, DomainError> {
        if self.shutdown.is_cancelled() {
            return Err(DomainError::Closed);
        }

        let (completion, outcome) = oneshot::channel();
        self.commands
            .send(Command::Send {
                message,
                options,
                completion,
            })
            .map_err(|_| DomainError::Closed)?;

        outcome.await.map_err(|_| DomainError::Closed)?
    }

    /// Stops the dispatcher and releases the socket. Queries still pending
    /// fail with `Closed`.
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Closing DNS client");
            self.shutdown.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// `true` while at least one query is waiting for its response.
    pub fn is_active(&self) -> bool {
        self.pending_queries() > 0
    }

    pub fn pending_queries(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn default_server(&self) -> Option<SocketAddr> {
        self.default_server
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for DnsClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
