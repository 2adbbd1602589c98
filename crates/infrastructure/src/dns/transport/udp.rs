//! UDP transport for DNS queries (RFC 1035 §4.2.1)
//!
//! One socket bound to an ephemeral local port serves every query of a
//! client. Messages are sent as-is, one datagram per attempt.

use super::DatagramTransport;
use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

pub const DEFAULT_RECV_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_SEND_BUFFER_SIZE: usize = 128 * 1024;

pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds a non-blocking socket with the given kernel buffer sizes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(
        local: SocketAddr,
        recv_buffer_size: usize,
        send_buffer_size: usize,
    ) -> io::Result<Self> {
        let domain = if local.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_recv_buffer_size(recv_buffer_size)?;
        socket.set_send_buffer_size(send_buffer_size)?;
        socket.bind(&local.into())?;
        socket.set_nonblocking(true)?;

        let std_socket: std::net::UdpSocket = socket.into();
        let socket = UdpSocket::from_std(std_socket)?;

        debug!(local = %socket.local_addr()?, "UDP socket bound");
        Ok(Self { socket })
    }

    /// Ephemeral-port wildcard address matching the family of `server`.
    /// IPv4 when no server is known yet.
    pub fn unspecified_for(server: Option<SocketAddr>) -> SocketAddr {
        match server {
            Some(SocketAddr::V6(_)) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
            _ => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        }
    }
}

#[async_trait]
impl DatagramTransport for UdpTransport {
    async fn send_to(&self, bytes: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(bytes, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
