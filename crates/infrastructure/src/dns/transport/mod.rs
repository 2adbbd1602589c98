pub mod udp;

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;

pub use udp::UdpTransport;

/// Unconnected datagram endpoint the client dispatcher sends through and
/// receives from.
///
/// `recv_from` must be cancel safe: the dispatcher drops a pending receive
/// whenever another event wins its select loop.
#[async_trait]
pub trait DatagramTransport: Send + Sync {
    async fn send_to(&self, bytes: &[u8], target: SocketAddr) -> io::Result<usize>;

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// Receive errors that leave the socket usable.
///
/// ICMP port-unreachable replies to an earlier send surface on the next
/// receive as `ConnectionRefused`/`ConnectionReset`; they describe one
/// remote, not the local endpoint.
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}
