//! Run timer
//!
//! Measures wall-clock time from the start of play until the final match.
//! The display refresh tick is a resource owned by exactly one run at a time:
//! [`RunTimer::start`] claims it, [`RunTimer::stop`] and [`RunTimer::cancel`]
//! release it, and a tick that arrives for anyone but the current owner is
//! dropped instead of being rescheduled.

use serde::Serialize;
use thiserror::Error;
use web_time::{Duration, Instant};

use crate::run::RunId;

/// Faults in timer usage
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The timer was stopped before it was started
    #[error("timer was never started")]
    NotStarted,
    /// The timer was already stopped and its elapsed time frozen
    #[error("timer was already stopped")]
    AlreadyStopped,
}

/// Wall-clock timer for a single run
#[derive(Debug, Clone, Default)]
pub struct RunTimer {
    /// Instant play began
    started_at: Option<Instant>,
    /// Latest elapsed time shown to the player
    sampled: Duration,
    /// Elapsed time at the final match, set once
    frozen: Option<Duration>,
    /// Run currently entitled to tick
    tick_owner: Option<RunId>,
}

impl RunTimer {
    /// Starts timing and claims the tick for `owner`
    ///
    /// Any tick held by a previous owner is released.
    pub fn start(&mut self, now: Instant, owner: RunId) {
        *self = Self {
            started_at: Some(now),
            sampled: Duration::ZERO,
            frozen: None,
            tick_owner: Some(owner),
        };
    }

    /// Whether a tick scheduled by `owner` should still run
    pub fn owns_tick(&self, owner: RunId) -> bool {
        self.tick_owner == Some(owner)
    }

    /// Recomputes the displayed elapsed time
    ///
    /// The sampled value never decreases.
    pub fn sample(&mut self, now: Instant) -> Duration {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        if let Some(started_at) = self.started_at {
            self.sampled = self.sampled.max(now.saturating_duration_since(started_at));
        }
        self.sampled
    }

    /// Freezes the elapsed time at `now` and releases the tick
    ///
    /// # Errors
    ///
    /// * `Error::NotStarted` - `start` was never called
    /// * `Error::AlreadyStopped` - the elapsed time is already frozen
    pub fn stop(&mut self, now: Instant) -> Result<Duration, Error> {
        let started_at = self.started_at.ok_or(Error::NotStarted)?;
        if self.frozen.is_some() {
            return Err(Error::AlreadyStopped);
        }
        let elapsed = self.sampled.max(now.saturating_duration_since(started_at));
        self.sampled = elapsed;
        self.frozen = Some(elapsed);
        self.tick_owner = None;
        Ok(elapsed)
    }

    /// Releases the tick without freezing anything
    pub fn cancel(&mut self) {
        self.tick_owner = None;
    }

    /// Latest sampled elapsed time
    pub fn elapsed(&self) -> Duration {
        self.frozen.unwrap_or(self.sampled)
    }

    /// Final elapsed time, once stopped
    pub fn frozen(&self) -> Option<Duration> {
        self.frozen
    }

    /// Whether the timer was started
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_timer_is_idle() {
        let timer = RunTimer::default();
        assert!(!timer.is_started());
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert_eq!(timer.frozen(), None);
    }

    #[test]
    fn test_start_claims_tick() {
        let owner = RunId::new();
        let mut timer = RunTimer::default();
        timer.start(Instant::now(), owner);
        assert!(timer.owns_tick(owner));
        assert!(!timer.owns_tick(RunId::new()));
    }

    #[test]
    fn test_restart_moves_tick_to_new_owner() {
        let old = RunId::new();
        let new = RunId::new();
        let mut timer = RunTimer::default();
        let now = Instant::now();
        timer.start(now, old);
        timer.start(now, new);
        assert!(!timer.owns_tick(old));
        assert!(timer.owns_tick(new));
    }

    #[test]
    fn test_sample_is_non_decreasing() {
        let start = Instant::now();
        let mut timer = RunTimer::default();
        timer.start(start, RunId::new());

        assert_eq!(
            timer.sample(start + Duration::from_millis(100)),
            Duration::from_millis(100)
        );
        // a late sample from an earlier instant cannot move the display back
        assert_eq!(
            timer.sample(start + Duration::from_millis(60)),
            Duration::from_millis(100)
        );
        assert_eq!(
            timer.sample(start + Duration::from_millis(150)),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn test_stop_freezes_at_stop_instant() {
        let start = Instant::now();
        let mut timer = RunTimer::default();
        let owner = RunId::new();
        timer.start(start, owner);
        timer.sample(start + Duration::from_millis(50));

        // completion lands between ticks
        let elapsed = timer.stop(start + Duration::from_millis(73)).unwrap();
        assert_eq!(elapsed, Duration::from_millis(73));
        assert_eq!(timer.frozen(), Some(Duration::from_millis(73)));
        assert!(!timer.owns_tick(owner));

        assert_eq!(
            timer.sample(start + Duration::from_secs(10)),
            Duration::from_millis(73)
        );
    }

    #[test]
    fn test_stop_twice_fails() {
        let start = Instant::now();
        let mut timer = RunTimer::default();
        timer.start(start, RunId::new());
        timer.stop(start + Duration::from_secs(1)).unwrap();
        assert_eq!(
            timer.stop(start + Duration::from_secs(2)),
            Err(Error::AlreadyStopped)
        );
        assert_eq!(timer.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_stop_without_start_fails() {
        let mut timer = RunTimer::default();
        assert_eq!(timer.stop(Instant::now()), Err(Error::NotStarted));
    }

    #[test]
    fn test_cancel_releases_tick_only() {
        let start = Instant::now();
        let owner = RunId::new();
        let mut timer = RunTimer::default();
        timer.start(start, owner);
        timer.sample(start + Duration::from_millis(200));
        timer.cancel();

        assert!(!timer.owns_tick(owner));
        assert_eq!(timer.frozen(), None);
        assert_eq!(timer.elapsed(), Duration::from_millis(200));
    }
}
