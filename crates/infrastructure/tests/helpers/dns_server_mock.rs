#![allow(dead_code)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use wiredns_domain::{RData, ResourceRecord};
use wiredns_infrastructure::dns::wire::{decode_message, encode_message};

pub const MOCK_ANSWER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

/// Loopback UDP server answering every question with `MOCK_ANSWER`.
///
/// With `silent_for(n)` it ignores the first `n` queries, which lets tests
/// exercise the client's retry path over a real socket.
pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start() -> Result<Self, std::io::Error> {
        Self::silent_for(0).await
    }

    pub async fn silent_for(ignored: usize) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            let seen = counter.fetch_add(1, Ordering::SeqCst);
                            if seen < ignored {
                                continue;
                            }
                            if let Some(response) = Self::build_mock_response(&buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    fn build_mock_response(query: &[u8]) -> Option<Vec<u8>> {
        let mut message = decode_message(query).ok()?;
        message.flags.response = true;
        message.flags.recursion_available = true;
        message.answers = message
            .questions
            .iter()
            .map(|q| ResourceRecord::new(q.name.clone(), 60, RData::A(MOCK_ANSWER)))
            .collect();
        encode_message(&message).ok()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiredns_domain::{Message, RecordType};

    #[tokio::test]
    async fn test_mock_server_responds() {
        let server = MockDnsServer::start().await.unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let mut query = Message::query("example.com", RecordType::A);
        query.id = 0x1234;
        client
            .send_to(&encode_message(&query).unwrap(), server.addr())
            .await
            .unwrap();

        let mut buf = vec![0u8; 512];
        let (len, _) = client.recv_from(&mut buf).await.unwrap();
        let response = decode_message(&buf[..len]).unwrap();

        assert_eq!(response.id, 0x1234, "Transaction ID should match");
        assert!(response.is_response(), "QR bit should be set");
        assert_eq!(response.answers.len(), 1);
        assert_eq!(server.queries_received(), 1);

        server.shutdown();
    }

    #[test]
    fn test_mock_response_ignores_garbage() {
        assert!(MockDnsServer::build_mock_response(&[0xab, 0xcd, 0x01]).is_none());
    }
}
