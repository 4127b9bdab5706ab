//! Host-side seams of a game session
//!
//! The game core never touches a screen, a network socket or the system
//! clock directly. The host supplies a [`Tunnel`] that delivers messages to
//! the player's view and a [`Clock`] that the run timer reads.

use std::cell::Cell;

use web_time::{Duration, Instant};

use super::{SyncMessage, UpdateMessage};

/// Trait for sending messages to the player's view
///
/// Implementations might render directly, post to a web worker, or push
/// through a WebSocket.
pub trait Tunnel {
    /// Sends an incremental update to the view
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends the complete current state to the view
    ///
    /// Used when the view (re)connects and has no prior state.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);

    /// Closes the tunnel
    fn close(self);
}

/// Source of monotonic time for the run timer
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
///
/// Useful for hosts that drive the game from recorded input, and for tests.
#[derive(Debug, Clone)]
pub struct ManualClock(Cell<Instant>);

impl ManualClock {
    /// Creates a clock frozen at the current instant
    pub fn new() -> Self {
        Self(Cell::new(Instant::now()))
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Instant {
        (*self).now()
    }
}
