//! The client's event loop.
//!
//! One task owns the socket's receive side, the live-query table and the
//! timer wheel. Commands from `DnsClient` handles, inbound datagrams and
//! timer expiries are all handled here, one at a time, so none of that state
//! needs a lock.

use super::options::SendOptions;
use super::query::{Completion, Query, TimeoutAction};
use crate::dns::transport::{is_transient, DatagramTransport};
use crate::dns::wire::{decode_message, encode_message};
use futures::StreamExt;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;
use tracing::{debug, trace, warn};
use wiredns_domain::{DomainError, Message};

pub enum Command {
    Send {
        message: Message,
        options: SendOptions,
        completion: Completion,
    },
}

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub default_server: Option<SocketAddr>,
    pub retry: u32,
    pub timeout: Duration,
    pub verify_responder: bool,
    pub max_datagram_size: usize,
}

pub struct Dispatcher {
    transport: Arc<dyn DatagramTransport>,
    settings: DispatcherSettings,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
    live: HashMap<u16, Query>,
    timers: DelayQueue<u16>,
    next_id: u16,
    pending: Arc<AtomicUsize>,
    recv_buf: Vec<u8>,
    /// Set once the socket has failed; every later query gets a copy.
    fatal: Option<DomainError>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn DatagramTransport>,
        settings: DispatcherSettings,
        commands: mpsc::UnboundedReceiver<Command>,
        shutdown: CancellationToken,
        pending: Arc<AtomicUsize>,
    ) -> Self {
        let recv_buf = vec![0u8; settings.max_datagram_size];
        Self {
            transport,
            settings,
            commands,
            shutdown,
            live: HashMap::new(),
            timers: DelayQueue::new(),
            next_id: 0,
            pending,
            recv_buf,
            fatal: None,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,

                command = self.commands.recv() => match command {
                    Some(Command::Send { message, options, completion }) => {
                        self.start_query(message, options, completion).await;
                    }
                    None => break,
                },

                received = self.transport.recv_from(&mut self.recv_buf), if self.fatal.is_none() => {
                    match received {
                        Ok((len, from)) => self.route(len, from),
                        Err(e) if is_transient(&e) => {
                            debug!(error = %e, "Ignoring transient receive error");
                        }
                        Err(e) => self.fail_all(DomainError::fatal(e)),
                    }
                }

                Some(expired) = self.timers.next() => {
                    self.on_timer(expired.into_inner()).await;
                }
            }
        }

        self.fail_remaining(DomainError::Closed);
        debug!("DNS client dispatcher stopped");
    }

    fn issue_id(&mut self) -> u16 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    async fn start_query(
        &mut self,
        mut message: Message,
        options: SendOptions,
        completion: Completion,
    ) {
        if let Some(err) = &self.fatal {
            let _ = completion.send(Err(err.clone()));
            return;
        }

        let Some(server) = options.server.or(self.settings.default_server) else {
            let _ = completion.send(Err(DomainError::ConfigError(
                "no DNS server configured and none given for this query".to_string(),
            )));
            return;
        };

        message.id = self.issue_id();
        let request = match encode_message(&message) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = completion.send(Err(e));
                return;
            }
        };

        let query = Query::new(
            message.id,
            server,
            request,
            options.retry.unwrap_or(self.settings.retry),
            options.timeout.unwrap_or(self.settings.timeout),
            completion,
        );
        self.register(query);
        self.transmit(message.id).await;
    }

    /// Inserts into the live table. A query still holding the same id is
    /// displaced and fails with `IdReused`.
    pub(crate) fn register(&mut self, query: Query) {
        let id = query.id();
        match self.live.insert(id, query) {
            Some(mut displaced) => {
                warn!(id, "Query id reissued while still pending");
                if let Some(key) = displaced.take_timer() {
                    self.timers.remove(&key);
                }
                displaced.fail(DomainError::IdReused(id));
            }
            None => {
                if self.pending.fetch_add(1, Ordering::Relaxed) == 0 {
                    trace!("DNS client transport active");
                }
            }
        }
    }

    pub(crate) fn deregister(&mut self, id: u16) -> Option<Query> {
        let mut query = self.live.remove(&id)?;
        if let Some(key) = query.take_timer() {
            self.timers.remove(&key);
        }
        if self.pending.fetch_sub(1, Ordering::Relaxed) == 1 {
            trace!("DNS client transport inert");
        }
        Some(query)
    }

    /// Sends the current attempt of a live query and arms its timer. A send
    /// error fails the query immediately.
    async fn transmit(&mut self, id: u16) {
        let Some((server, request)) = self
            .live
            .get(&id)
            .map(|q| (q.server(), q.request().to_vec()))
        else {
            return;
        };

        if let Err(e) = self.transport.send_to(&request, server).await {
            warn!(id, server = %server, error = %e, "Failed to send DNS query");
            if let Some(mut query) = self.deregister(id) {
                query.fail(DomainError::transport(server, e));
            }
            return;
        }

        if let Some(query) = self.live.get_mut(&id) {
            let key = self.timers.insert(id, query.timeout());
            query.mark_sent(key);
            debug!(id, server = %server, attempt = query.attempts(), "DNS query sent");
        }
    }

    async fn on_timer(&mut self, id: u16) {
        let Some(query) = self.live.get_mut(&id) else {
            return;
        };

        match query.on_timeout() {
            TimeoutAction::Retry => {
                debug!(id, attempts = query.attempts(), "DNS query timed out, retrying");
                self.transmit(id).await;
            }
            TimeoutAction::Exhausted(err) => {
                debug!(id, error = %err, "DNS query failed");
                if let Some(mut query) = self.deregister(id) {
                    query.fail(err);
                }
            }
        }
    }

    /// Hands an inbound datagram to its query. Anything that does not decode,
    /// is not a response, or matches no live id is dropped.
    fn route(&mut self, len: usize, from: SocketAddr) {
        let Ok(response) = decode_message(&self.recv_buf[..len]) else {
            return;
        };
        if !response.is_response() {
            return;
        }

        let Some(query) = self.live.get(&response.id) else {
            trace!(id = response.id, from = %from, "Response for unknown query id");
            return;
        };

        if self.settings.verify_responder && query.server() != from {
            warn!(
                id = response.id,
                expected = %query.server(),
                received_from = %from,
                "Dropping DNS response from unexpected source"
            );
            return;
        }

        if let Some(mut query) = self.deregister(response.id) {
            debug!(id = response.id, attempts = query.attempts(), "DNS query resolved");
            query.resolve(response);
        }
    }

    /// The socket is unusable: every pending query fails with the same
    /// cause and receiving stops for good.
    fn fail_all(&mut self, err: DomainError) {
        warn!(error = %err, pending = self.live.len(), "DNS client transport failed");
        self.fail_remaining(err.clone());
        self.fatal = Some(err);
    }

    fn fail_remaining(&mut self, err: DomainError) {
        let ids: Vec<u16> = self.live.keys().copied().collect();
        for id in ids {
            if let Some(mut query) = self.deregister(id) {
                query.fail(err.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io;
    use tokio::sync::oneshot;

    struct NullTransport;

    #[async_trait]
    impl DatagramTransport for NullTransport {
        async fn send_to(&self, bytes: &[u8], _target: SocketAddr) -> io::Result<usize> {
            Ok(bytes.len())
        }

        async fn recv_from(&self, _buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            std::future::pending().await
        }

        fn local_addr(&self) -> io::Result<SocketAddr> {
            Ok("127.0.0.1:0".parse().unwrap())
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<AtomicUsize>) {
        let (_tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let settings = DispatcherSettings {
            default_server: Some("192.0.2.1:53".parse().unwrap()),
            retry: 1,
            timeout: Duration::from_millis(2000),
            verify_responder: false,
            max_datagram_size: 512,
        };
        let dispatcher = Dispatcher::new(
            Arc::new(NullTransport),
            settings,
            rx,
            CancellationToken::new(),
            pending.clone(),
        );
        (dispatcher, pending)
    }

    fn query(id: u16) -> (Query, oneshot::Receiver<Result<Message, DomainError>>) {
        let (tx, rx) = oneshot::channel();
        let server = "192.0.2.1:53".parse().unwrap();
        (Query::new(id, server, vec![0; 12], 1, Duration::from_secs(2), tx), rx)
    }

    #[test]
    fn test_ids_wrap_around() {
        let (mut dispatcher, _) = dispatcher();
        dispatcher.next_id = u16::MAX;
        assert_eq!(dispatcher.issue_id(), u16::MAX);
        assert_eq!(dispatcher.issue_id(), 0);
        assert_eq!(dispatcher.issue_id(), 1);
    }

    #[tokio::test]
    async fn test_reissued_id_displaces_older_query() {
        let (mut dispatcher, pending) = dispatcher();
        let (older, mut older_rx) = query(42);
        let (newer, mut newer_rx) = query(42);

        dispatcher.register(older);
        dispatcher.register(newer);

        assert!(matches!(
            older_rx.try_recv(),
            Ok(Err(DomainError::IdReused(42)))
        ));
        assert!(newer_rx.try_recv().is_err());
        assert_eq!(dispatcher.live.len(), 1);
        assert_eq!(pending.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_liveness_tracks_table() {
        let (mut dispatcher, pending) = dispatcher();
        let (a, _a_rx) = query(1);
        let (b, _b_rx) = query(2);

        dispatcher.register(a);
        dispatcher.register(b);
        assert_eq!(pending.load(Ordering::Relaxed), 2);

        assert!(dispatcher.deregister(1).is_some());
        assert!(dispatcher.deregister(1).is_none());
        assert_eq!(pending.load(Ordering::Relaxed), 1);

        dispatcher.fail_remaining(DomainError::Closed);
        assert_eq!(pending.load(Ordering::Relaxed), 0);
        assert_eq!(dispatcher.live.len(), 0);
    }

    #[tokio::test]
    async fn test_transmit_arms_timer() {
        let (mut dispatcher, _) = dispatcher();
        let (q, _rx) = query(9);
        dispatcher.register(q);
        dispatcher.transmit(9).await;

        assert_eq!(dispatcher.timers.len(), 1);
        assert_eq!(dispatcher.live[&9].attempts(), 1);

        dispatcher.deregister(9);
        assert!(dispatcher.timers.is_empty());
    }
}
