//! Lifecycle of one outstanding query.
//!
//! `Created → Sent → {Resolved | Failed | Sent (after a retry)}`. The
//! dispatcher drives every transition; a query never touches the socket or
//! the timer wheel itself, it only records which timer it holds and decides
//! what a timeout means.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::time::delay_queue;
use wiredns_domain::{DomainError, Message};

pub type Completion = oneshot::Sender<Result<Message, DomainError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Created,
    Sent,
    Resolved,
    Failed,
}

/// What the dispatcher should do after an attempt timed out.
#[derive(Debug)]
pub enum TimeoutAction {
    /// Resend the same bytes and rearm the timer.
    Retry,
    /// Retry budget spent; fail with the carried error.
    Exhausted(DomainError),
}

#[derive(Debug)]
pub struct Query {
    id: u16,
    server: SocketAddr,
    request: Vec<u8>,
    retries_left: u32,
    attempts: u32,
    timeout: Duration,
    timer: Option<delay_queue::Key>,
    state: QueryState,
    completion: Option<Completion>,
}

impl Query {
    pub fn new(
        id: u16,
        server: SocketAddr,
        request: Vec<u8>,
        retry: u32,
        timeout: Duration,
        completion: Completion,
    ) -> Self {
        Self {
            id,
            server,
            request,
            retries_left: retry,
            attempts: 0,
            timeout,
            timer: None,
            state: QueryState::Created,
            completion: Some(completion),
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Serialized request, identical for every attempt.
    pub fn request(&self) -> &[u8] {
        &self.request
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[cfg(test)]
    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, QueryState::Resolved | QueryState::Failed)
    }

    /// Records a completed transmission and the timer armed for it.
    pub fn mark_sent(&mut self, timer: delay_queue::Key) {
        debug_assert!(!self.is_terminal());
        self.attempts += 1;
        self.timer = Some(timer);
        self.state = QueryState::Sent;
    }

    /// Hands back the armed timer so the caller can disarm it.
    pub fn take_timer(&mut self) -> Option<delay_queue::Key> {
        self.timer.take()
    }

    /// Called once the armed timer has fired. The timer key is already
    /// spent at this point and is dropped.
    pub fn on_timeout(&mut self) -> TimeoutAction {
        self.timer = None;
        if self.retries_left > 0 {
            self.retries_left -= 1;
            return TimeoutAction::Retry;
        }
        TimeoutAction::Exhausted(DomainError::Timeout {
            attempts: self.attempts,
            timeout_ms: self.timeout.as_millis() as u64,
        })
    }

    pub fn resolve(&mut self, response: Message) {
        self.settle(QueryState::Resolved, Ok(response));
    }

    pub fn fail(&mut self, err: DomainError) {
        self.settle(QueryState::Failed, Err(err));
    }

    fn settle(&mut self, state: QueryState, outcome: Result<Message, DomainError>) {
        if self.is_terminal() {
            return;
        }
        self.state = state;
        if let Some(completion) = self.completion.take() {
            // The caller may have stopped waiting; nothing to report to.
            let _ = completion.send(outcome);
        }
    }
}
