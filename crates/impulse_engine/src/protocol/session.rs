//! Connection state machine and message exchange
//!
//! The socket plumbing itself lives outside the engine; what the protocol
//! layer owns is the client-side connection lifecycle — legal state
//! transitions, grace-period timeouts detected on poll — and the
//! lock-protected double buffer decoded messages cross on their way from
//! the receive callback to the game loop. Transport failures become state
//! transitions and log lines, never exceptions into the game loop.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{info, warn};
use thiserror::Error;

use crate::core::config::ProtocolConfig;

/// Connection lifecycle errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A transition outside the legal lifecycle was requested
    #[error("illegal connection transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// State the connection was in
        from: ConnectionState,
        /// State that was requested
        to: ConnectionState,
    },
}

/// Client-side connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; the only state a connect may start from
    Disconnected,
    /// Connect issued, not yet acknowledged
    Connecting,
    /// Session established; messages flow
    Connected,
    /// Teardown in progress
    Disconnecting,
}

impl ConnectionState {
    /// Whether the lifecycle permits moving to `next`
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Connected)
                | (Self::Connecting, Self::Disconnecting)
                | (Self::Connected, Self::Disconnecting)
                | (Self::Disconnecting, Self::Disconnected)
        )
    }
}

/// Connection lifecycle tracker
///
/// Holds the current state, enforces legal transitions, and detects
/// grace-period timeouts by comparing elapsed wall-clock time on each poll.
#[derive(Debug)]
pub struct Connection {
    state: ConnectionState,
    grace: Duration,
    entered_at: Instant,
}

impl Connection {
    /// Create a disconnected connection with a timeout grace period
    pub fn new(grace: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            grace,
            entered_at: Instant::now(),
        }
    }

    /// Create a connection using the configured grace period
    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::new(Duration::from_secs_f32(config.connection_grace_seconds))
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Request a lifecycle transition
    pub fn transition(&mut self, to: ConnectionState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(to) {
            return Err(SessionError::IllegalTransition { from: self.state, to });
        }
        info!("connection {:?} -> {:?}", self.state, to);
        self.state = to;
        self.entered_at = Instant::now();
        Ok(())
    }

    /// Force teardown after a transport failure
    ///
    /// Skips the legality check: whatever the socket was doing, the session
    /// is over. Already-disconnected connections stay put.
    pub fn force_disconnect(&mut self, reason: &str) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        warn!("connection forced down from {:?}: {reason}", self.state);
        self.state = ConnectionState::Disconnecting;
        self.entered_at = Instant::now();
    }

    /// Check for a grace-period timeout in a transitional state
    ///
    /// Returns `true` when the poll advanced the state: a connect attempt
    /// that outlived the grace period starts tearing down, a teardown that
    /// outlived it is declared disconnected.
    pub fn poll_timeout(&mut self) -> bool {
        if self.entered_at.elapsed() < self.grace {
            return false;
        }
        match self.state {
            ConnectionState::Connecting => {
                warn!("connect attempt timed out after {:?}", self.grace);
                self.state = ConnectionState::Disconnecting;
                self.entered_at = Instant::now();
                true
            }
            ConnectionState::Disconnecting => {
                info!("teardown grace elapsed, connection closed");
                self.state = ConnectionState::Disconnected;
                self.entered_at = Instant::now();
                true
            }
            ConnectionState::Disconnected | ConnectionState::Connected => false,
        }
    }
}

/// Lock-protected double buffer between producer and consumer threads
///
/// The producer (socket callback) pushes into the inner vector; the
/// consumer (game loop) swaps its own drained vector in, taking the whole
/// batch in one lock acquisition and leaving its empty buffer behind for
/// reuse.
#[derive(Debug, Default)]
pub struct ExchangeBuffer<T> {
    inbox: Mutex<Vec<T>>,
}

impl<T> ExchangeBuffer<T> {
    /// Create an empty exchange buffer
    pub fn new() -> Self {
        Self { inbox: Mutex::new(Vec::new()) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.inbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Producer side: enqueue one item
    pub fn push(&self, item: T) {
        self.lock().push(item);
    }

    /// Consumer side: swap the pending batch into `drained`
    ///
    /// `drained` should arrive empty (its previous contents consumed); it
    /// comes back holding everything pushed since the last swap.
    pub fn swap(&self, drained: &mut Vec<T>) {
        std::mem::swap(&mut *self.lock(), drained);
    }

    /// Number of pending items
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no items are pending
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_starts_disconnected() {
        let connection = Connection::from_config(&ProtocolConfig::default());
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_full_lifecycle_is_legal() {
        let mut connection = Connection::new(Duration::from_secs(5));
        connection.transition(ConnectionState::Connecting).unwrap();
        connection.transition(ConnectionState::Connected).unwrap();
        connection.transition(ConnectionState::Disconnecting).unwrap();
        connection.transition(ConnectionState::Disconnected).unwrap();
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut connection = Connection::new(Duration::from_secs(5));
        assert_eq!(
            connection.transition(ConnectionState::Connected),
            Err(SessionError::IllegalTransition {
                from: ConnectionState::Disconnected,
                to: ConnectionState::Connected,
            })
        );

        connection.transition(ConnectionState::Connecting).unwrap();
        assert!(connection.transition(ConnectionState::Disconnected).is_err());
        assert_eq!(connection.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_forced_disconnect_skips_legality() {
        let mut connection = Connection::new(Duration::from_secs(5));
        connection.transition(ConnectionState::Connecting).unwrap();
        connection.transition(ConnectionState::Connected).unwrap();

        connection.force_disconnect("socket reset by peer");
        assert_eq!(connection.state(), ConnectionState::Disconnecting);

        // Idempotent once fully down
        connection.transition(ConnectionState::Disconnected).unwrap();
        connection.force_disconnect("late callback");
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_poll_times_out_transitional_states() {
        let mut connection = Connection::new(Duration::from_millis(1));
        connection.transition(ConnectionState::Connecting).unwrap();

        std::thread::sleep(Duration::from_millis(5));
        assert!(connection.poll_timeout());
        assert_eq!(connection.state(), ConnectionState::Disconnecting);

        std::thread::sleep(Duration::from_millis(5));
        assert!(connection.poll_timeout());
        assert_eq!(connection.state(), ConnectionState::Disconnected);

        // Settled states never time out
        assert!(!connection.poll_timeout());
    }

    #[test]
    fn test_connected_state_never_times_out() {
        let mut connection = Connection::new(Duration::from_millis(1));
        connection.transition(ConnectionState::Connecting).unwrap();
        connection.transition(ConnectionState::Connected).unwrap();

        std::thread::sleep(Duration::from_millis(5));
        assert!(!connection.poll_timeout());
        assert_eq!(connection.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_exchange_swap_takes_whole_batch() {
        let exchange = ExchangeBuffer::new();
        exchange.push(1);
        exchange.push(2);
        exchange.push(3);

        let mut batch = Vec::new();
        exchange.swap(&mut batch);
        assert_eq!(batch, vec![1, 2, 3]);
        assert!(exchange.is_empty());

        // Nothing new pushed: the next swap comes back empty
        batch.clear();
        exchange.swap(&mut batch);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_exchange_across_threads() {
        let exchange = std::sync::Arc::new(ExchangeBuffer::new());
        let producer = {
            let exchange = std::sync::Arc::clone(&exchange);
            std::thread::spawn(move || {
                for i in 0..100 {
                    exchange.push(i);
                }
            })
        };
        producer.join().unwrap();

        let mut batch = Vec::new();
        exchange.swap(&mut batch);
        assert_eq!(batch.len(), 100);
    }
}
