//! Score submission
//!
//! Turns a finished [`Run`] into a [`ScoreRecord`] and sends it to the
//! leaderboard once. Sending is split in two steps so the leaderboard can be
//! reached asynchronously: [`begin`] builds the record and marks the run
//! pending, [`complete`] applies the leaderboard's answer. A failed send
//! leaves the run resubmittable; retrying is up to the player.

use garde::Validate;
use serde::Serialize;
use thiserror::Error;
use web_time::Duration;

use crate::{
    identity::{self, IdentityProvider},
    leaderboard::{LeaderboardService, ScoreRecord, ServiceError},
    run::{Run, SubmissionStatus},
};

/// Reasons a submission did not happen
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// There is no finished run to submit
    #[error("no finished run to submit")]
    NotFinished,
    /// The run did not match the whole alphabet
    #[error("only completed runs can be submitted")]
    Incomplete,
    /// A score for this run was already accepted
    #[error("score was already submitted")]
    AlreadySubmitted,
    /// A score for this run is waiting for the leaderboard's answer
    #[error("score is already being submitted")]
    InFlight,
    /// The record failed local validation and was never sent
    #[error("could not submit: {0}")]
    Invalid(String),
    /// The leaderboard did not store the score
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Rounds an elapsed time to millisecond precision, in seconds
pub fn elapsed_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.).round() / 1000.
}

/// Builds the record a finished run would be submitted as
///
/// # Errors
///
/// * `Error::Incomplete` - the run has not matched all 26 letters
/// * `Error::Invalid` - the record fails validation
pub fn record_for<I: IdentityProvider + ?Sized>(
    run: &Run,
    identity: &I,
) -> Result<ScoreRecord, Error> {
    let elapsed = run
        .elapsed()
        .filter(|_| run.is_complete())
        .ok_or(Error::Incomplete)?;

    let record = ScoreRecord {
        player_identifier: identity::resolve(identity),
        elapsed_seconds: elapsed_seconds(elapsed),
        letters_completed: u8::try_from(run.expected_index())
            .map_err(|e| Error::Invalid(e.to_string()))?,
    };

    record
        .validate()
        .map_err(|report| Error::Invalid(report.to_string()))?;

    Ok(record)
}

/// Starts a submission, returning the record to send
///
/// The run is pending until [`complete`] is called with the leaderboard's
/// answer.
///
/// # Errors
///
/// * `Error::AlreadySubmitted` - the run was already submitted
/// * `Error::InFlight` - an earlier send has not been answered yet
/// * `Error::Incomplete` / `Error::Invalid` - see [`record_for`]
pub fn begin<I: IdentityProvider + ?Sized>(
    run: &mut Run,
    identity: &I,
) -> Result<ScoreRecord, Error> {
    match run.submission() {
        SubmissionStatus::Submitted => return Err(Error::AlreadySubmitted),
        SubmissionStatus::Pending => return Err(Error::InFlight),
        SubmissionStatus::Unsent => {}
    }

    let record = record_for(run, identity)?;
    run.set_submission(SubmissionStatus::Pending);
    Ok(record)
}

/// Applies the leaderboard's answer to a pending submission
///
/// # Errors
///
/// Returns `Error::Service` when the leaderboard did not store the score.
/// The run is then resubmittable.
pub fn complete(run: &mut Run, result: Result<(), ServiceError>) -> Result<(), Error> {
    match result {
        Ok(()) => {
            run.set_submission(SubmissionStatus::Submitted);
            log::info!("run {} submitted", run.id());
            Ok(())
        }
        Err(e) => {
            run.set_submission(SubmissionStatus::Unsent);
            log::warn!("score submission for run {} failed: {e}", run.id());
            Err(e.into())
        }
    }
}

/// Submits through a leaderboard that answers synchronously
///
/// Suits local services such as
/// [`MemoryLeaderboard`](crate::leaderboard::MemoryLeaderboard). Remote
/// leaderboards go through [`begin`] and [`complete`] instead.
#[derive(Debug, Clone)]
pub struct ScoreClient<S, I> {
    service: S,
    identity: I,
}

impl<S: LeaderboardService, I: IdentityProvider> ScoreClient<S, I> {
    /// Creates a client sending to `service`, naming players through `identity`
    pub fn new(service: S, identity: I) -> Self {
        Self { service, identity }
    }

    /// Builds the record a finished run would be submitted as
    ///
    /// # Errors
    ///
    /// See [`record_for`].
    pub fn record_for(&self, run: &Run) -> Result<ScoreRecord, Error> {
        record_for(run, &self.identity)
    }

    /// Sends a finished run's score
    ///
    /// On success the run is marked submitted and every later call fails with
    /// `Error::AlreadySubmitted`, so at most one record is stored per run.
    ///
    /// # Errors
    ///
    /// * any error of [`begin`]
    /// * `Error::Service` - the leaderboard did not store the score; the run
    ///   stays resubmittable
    pub fn submit(&self, run: &mut Run) -> Result<(), Error> {
        let record = begin(run, &self.identity)?;
        let result = self.service.save_score(&record);
        complete(run, result)
    }
}
