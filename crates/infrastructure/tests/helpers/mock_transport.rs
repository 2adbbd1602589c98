#![allow(dead_code)]
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use wiredns_domain::Message;
use wiredns_infrastructure::dns::transport::DatagramTransport;
use wiredns_infrastructure::dns::wire::{decode_message, encode_message};

type Inbound = io::Result<(Vec<u8>, SocketAddr)>;

/// In-memory datagram endpoint. Records every datagram the client sends and
/// delivers whatever the test injects as inbound traffic.
pub struct MockTransport {
    local: SocketAddr,
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    sent_tx: mpsc::UnboundedSender<(Vec<u8>, SocketAddr)>,
    sent_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<(Vec<u8>, SocketAddr)>>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>,
    fail_sends: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            local: "127.0.0.1:40000".parse().unwrap(),
            sent: Mutex::new(Vec::new()),
            sent_tx,
            sent_rx: tokio::sync::Mutex::new(sent_rx),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            fail_sends: AtomicBool::new(false),
        }
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }

    /// Waits for the next datagram the client transmits and decodes it.
    pub async fn next_query(&self) -> (Message, SocketAddr) {
        let (bytes, target) = self
            .sent_rx
            .lock()
            .await
            .recv()
            .await
            .expect("mock transport dropped");
        (decode_message(&bytes).unwrap(), target)
    }

    pub fn deliver_bytes(&self, bytes: Vec<u8>, from: SocketAddr) {
        let _ = self.inbound_tx.send(Ok((bytes, from)));
    }

    pub fn deliver(&self, message: &Message, from: SocketAddr) {
        self.deliver_bytes(encode_message(message).unwrap(), from);
    }

    pub fn inject_error(&self, kind: io::ErrorKind) {
        let _ = self
            .inbound_tx
            .send(Err(io::Error::new(kind, "injected receive error")));
    }
}

#[async_trait]
impl DatagramTransport for MockTransport {
    async fn send_to(&self, bytes: &[u8], target: SocketAddr) -> io::Result<usize> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected send error",
            ));
        }
        self.sent.lock().unwrap().push((bytes.to_vec(), target));
        let _ = self.sent_tx.send((bytes.to_vec(), target));
        Ok(bytes.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let mut inbound = self.inbound_rx.lock().await;
        match inbound.recv().await {
            Some(Ok((bytes, from))) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok((len, from))
            }
            Some(Err(e)) => Err(e),
            None => std::future::pending().await,
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }
}
