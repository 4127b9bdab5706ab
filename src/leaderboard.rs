//! Leaderboard records, service seam and query client
//!
//! The leaderboard itself lives outside the game: a hosted table exposing
//! "save a score" and "list the fastest scores". This module defines the
//! records exchanged with it, the [`LeaderboardService`] trait hosts
//! implement to reach it, the [`LeaderboardClient`] the views use to read it,
//! and [`MemoryLeaderboard`], a local implementation of the service.

use std::{cell::RefCell, rc::Rc};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    constants::{
        identity::{ANONYMOUS, MAX_LENGTH},
        leaderboard::MAX_LIMIT,
        run::MAX_LETTERS_COMPLETED,
    },
    session::Tunnel,
};

/// Validates that an elapsed time is a finite, non-negative number of seconds
///
/// # Errors
///
/// Returns a `garde::Error` for negative, infinite or NaN values.
fn validate_elapsed(val: &f64, _ctx: &()) -> garde::Result {
    if val.is_finite() && *val >= 0. {
        Ok(())
    } else {
        Err(garde::Error::new("must be a finite, non-negative number"))
    }
}

/// A finished run as sent to the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScoreRecord {
    /// Username or handle, `anonymous` when unknown
    #[garde(length(chars, min = 1, max = MAX_LENGTH))]
    pub player_identifier: String,
    /// Time from start of play to the final match, millisecond precision
    #[garde(custom(validate_elapsed))]
    pub elapsed_seconds: f64,
    /// Number of letters matched
    #[garde(range(max = MAX_LETTERS_COMPLETED))]
    pub letters_completed: u8,
}

impl ScoreRecord {
    /// Replaces a blank identifier with [`ANONYMOUS`]
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.player_identifier.trim().is_empty() {
            self.player_identifier = ANONYMOUS.to_owned();
        }
        self
    }
}

/// A score as stored by the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScore {
    /// The submitted record
    #[serde(flatten)]
    pub record: ScoreRecord,
    /// Time the leaderboard stored the record
    pub created_at: SystemTime,
}

/// Failures reported by a leaderboard service
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached
    #[error("could not reach the leaderboard: {0}")]
    Transport(String),
    /// The service answered with an error
    #[error("leaderboard rejected the request: {0}")]
    Rejected(String),
}

/// The hosted leaderboard the game talks to
pub trait LeaderboardService {
    /// Persists one score
    ///
    /// # Errors
    ///
    /// Returns a `ServiceError` if the score was not stored.
    fn save_score(&self, record: &ScoreRecord) -> Result<(), ServiceError>;

    /// Lists stored scores, fastest first, at most `limit` of them
    ///
    /// # Errors
    ///
    /// Returns a `ServiceError` if the scores could not be read.
    fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>, ServiceError>;
}

impl<S: LeaderboardService + ?Sized> LeaderboardService for &S {
    fn save_score(&self, record: &ScoreRecord) -> Result<(), ServiceError> {
        (**self).save_score(record)
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>, ServiceError> {
        (**self).leaderboard(limit)
    }
}

impl<S: LeaderboardService + ?Sized> LeaderboardService for Rc<S> {
    fn save_score(&self, record: &ScoreRecord) -> Result<(), ServiceError> {
        (**self).save_score(record)
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>, ServiceError> {
        (**self).leaderboard(limit)
    }
}

/// Sorts scores fastest first, keeping insertion order among equal times
fn fastest_first<'a, I: IntoIterator<Item = &'a StoredScore>>(
    scores: I,
    limit: usize,
) -> Vec<StoredScore> {
    scores
        .into_iter()
        .sorted_by(|a, b| a.record.elapsed_seconds.total_cmp(&b.record.elapsed_seconds))
        .take(limit.min(MAX_LIMIT))
        .cloned()
        .collect_vec()
}

/// Leaderboard service kept in memory
///
/// Single-threaded; each instance is its own leaderboard.
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    scores: RefCell<Vec<StoredScore>>,
}

impl MemoryLeaderboard {
    /// Number of stored scores
    pub fn len(&self) -> usize {
        self.scores.borrow().len()
    }

    /// Whether no score was stored yet
    pub fn is_empty(&self) -> bool {
        self.scores.borrow().is_empty()
    }
}

impl LeaderboardService for MemoryLeaderboard {
    fn save_score(&self, record: &ScoreRecord) -> Result<(), ServiceError> {
        let record = record.clone().normalized();
        record
            .validate()
            .map_err(|report| ServiceError::Rejected(report.to_string()))?;
        self.scores.borrow_mut().push(StoredScore {
            record,
            created_at: SystemTime::now(),
        });
        Ok(())
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>, ServiceError> {
        Ok(fastest_first(self.scores.borrow().iter(), limit))
    }
}

/// What the leaderboard view should show
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeaderboardView {
    /// Scores fastest first
    pub entries: Vec<StoredScore>,
    /// Set when the scores could not be fetched
    pub unavailable: Option<ServiceError>,
}

impl LeaderboardView {
    /// Whether there is nothing to list
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with their 1-indexed position
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &StoredScore)> {
        self.entries.iter().enumerate().map(|(i, entry)| (i + 1, entry))
    }
}

/// Read side of the leaderboard used by the views
///
/// Failures never propagate: the view degrades to an empty board.
#[derive(Debug, Clone)]
pub struct LeaderboardClient<S> {
    service: S,
}

impl<S: LeaderboardService> LeaderboardClient<S> {
    /// Creates a client over a service
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Fetches at most `n` scores (capped at 50), fastest first
    ///
    /// The result is re-sorted locally so a service that ignores ordering
    /// or the limit cannot break the view.
    pub fn fetch(&self, n: usize) -> LeaderboardView {
        let limit = n.min(MAX_LIMIT);
        match self.service.leaderboard(limit) {
            Ok(scores) => LeaderboardView {
                entries: fastest_first(&scores, limit),
                unavailable: None,
            },
            Err(e) => {
                log::warn!("leaderboard unavailable: {e}");
                LeaderboardView {
                    entries: Vec::new(),
                    unavailable: Some(e),
                }
            }
        }
    }

    /// Fetches at most `n` scores, empty on failure
    pub fn fetch_top(&self, n: usize) -> Vec<StoredScore> {
        self.fetch(n).entries
    }

    /// Fetches at most `n` scores and sends them to a view
    pub fn announce<T: Tunnel>(&self, n: usize, tunnel: &T) {
        tunnel.send_message(&self.fetch(n).into());
    }
}
