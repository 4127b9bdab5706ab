//! A single playthrough
//!
//! A [`Run`] is created when the countdown reaches zero and lives until the
//! player plays again or leaves. It owns the board layout, progress through
//! the alphabet, tile feedback, the run timer and submission bookkeeping.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;
use web_time::{Duration, Instant};

use crate::{
    constants::run::LETTER_COUNT,
    evaluator::{self, Evaluation, Tiles},
    letter::Letter,
    sequencer::{self, BoardLayout},
    timer::{self, RunTimer},
};

/// A unique identifier for a run
///
/// Every countdown and every run gets a fresh id. Alarms carry the id they
/// were scheduled for, so alarms belonging to an abandoned run are dropped.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random run id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// What a tap did to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tile was already matched, nothing changed
    Ignored,
    /// The expected letter was tapped
    Matched {
        /// Count of matched letters after this tap
        expected_index: usize,
    },
    /// The final letter was tapped and the elapsed time frozen
    Completed {
        /// Final elapsed time
        elapsed: Duration,
    },
    /// A wrong letter was tapped and its tile started flashing
    Flashed {
        /// Generation the clear alarm must carry
        generation: u32,
    },
}

/// Where a run's score stands with the leaderboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SubmissionStatus {
    /// Never sent, or the last send failed
    #[default]
    Unsent,
    /// Sent and waiting for the leaderboard's answer
    Pending,
    /// Stored by the leaderboard
    Submitted,
}

/// State of one playthrough
#[derive(Debug, Clone)]
pub struct Run {
    id: RunId,
    layout: BoardLayout,
    expected_index: usize,
    tiles: Tiles,
    timer: RunTimer,
    submission: SubmissionStatus,
}

impl Run {
    /// Creates a run with a freshly shuffled layout and starts its timer
    pub fn start(id: RunId, now: Instant) -> Self {
        Self::with_layout(id, sequencer::shuffle(), now)
    }

    /// Creates a run with a given layout and starts its timer
    pub fn with_layout(id: RunId, layout: BoardLayout, now: Instant) -> Self {
        let mut timer = RunTimer::default();
        timer.start(now, id);
        Self {
            id,
            layout,
            expected_index: 0,
            tiles: Tiles::default(),
            timer,
            submission: SubmissionStatus::Unsent,
        }
    }

    /// Applies a tap
    ///
    /// # Errors
    ///
    /// Returns a `timer::Error` if the final match could not freeze the
    /// timer. The run is unusable afterwards.
    pub fn tap(&mut self, letter: Letter, now: Instant) -> Result<TapOutcome, timer::Error> {
        if self.is_complete() || self.tiles.is_correct(letter) {
            return Ok(TapOutcome::Ignored);
        }

        let Evaluation {
            is_match,
            new_expected_index,
        } = evaluator::evaluate(letter, self.expected_index);

        if !is_match {
            return Ok(self
                .tiles
                .flash(letter)
                .map_or(TapOutcome::Ignored, |generation| TapOutcome::Flashed {
                    generation,
                }));
        }

        self.tiles.mark_correct(letter);
        self.expected_index = new_expected_index;

        if self.is_complete() {
            let elapsed = self.timer.stop(now)?;
            Ok(TapOutcome::Completed { elapsed })
        } else {
            Ok(TapOutcome::Matched {
                expected_index: new_expected_index,
            })
        }
    }

    /// Id of this run
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Display order of the tiles
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Count of letters matched so far
    pub fn expected_index(&self) -> usize {
        self.expected_index
    }

    /// Letter to tap next, `None` once complete
    pub fn expected_letter(&self) -> Option<Letter> {
        sequencer::expected_letter(self.expected_index)
    }

    /// Whether every letter was matched
    pub fn is_complete(&self) -> bool {
        self.expected_index == LETTER_COUNT
    }

    /// Tile feedback board
    pub fn tiles(&self) -> &Tiles {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut Tiles {
        &mut self.tiles
    }

    /// The run's timer
    pub fn timer(&self) -> &RunTimer {
        &self.timer
    }

    pub(crate) fn timer_mut(&mut self) -> &mut RunTimer {
        &mut self.timer
    }

    /// Final elapsed time, `None` until complete
    pub fn elapsed(&self) -> Option<Duration> {
        self.timer.frozen()
    }

    /// Where the run's score stands
    pub fn submission(&self) -> SubmissionStatus {
        self.submission
    }

    /// Whether a score for this run was accepted by the leaderboard
    pub fn is_submitted(&self) -> bool {
        self.submission == SubmissionStatus::Submitted
    }

    pub(crate) fn set_submission(&mut self, status: SubmissionStatus) {
        self.submission = status;
    }
}
