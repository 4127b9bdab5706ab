//! # A→Z Rush Game Library
//!
//! This library provides the core logic for "Tap A→Z Rush", a race to tap
//! the letters A through Z in order on a shuffled board. It handles the
//! game phases, tap matching, run timing, score submission and leaderboard
//! reads. Screens, networking and the clock are supplied by the host.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod evaluator;
pub mod game;
pub mod identity;
pub mod leaderboard;
pub mod letter;
pub mod run;
pub mod sequencer;
pub mod session;
pub mod submission;
pub mod timer;

use letter::Letter;
use run::RunId;

/// Messages sent to synchronize the complete view with the game
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Game phase synchronization
    Game(game::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages sent to update part of the view
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Game progress updates
    Game(game::UpdateMessage),
    /// A freshly fetched leaderboard
    Leaderboard(leaderboard::LeaderboardView),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Timed events the host delivers back to the game
///
/// Each alarm names the run it was scheduled for. Alarms for any other run
/// are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Advance the countdown to `remaining`, starting play at zero
    Countdown {
        /// Countdown the alarm belongs to
        run: RunId,
        /// Number to show next
        remaining: u8,
    },
    /// Refresh the elapsed time display
    Tick {
        /// Run the alarm belongs to
        run: RunId,
    },
    /// End an incorrect flash on a tile
    ClearFlash {
        /// Run the alarm belongs to
        run: RunId,
        /// Flashing tile
        letter: Letter,
        /// Flash generation the alarm was scheduled for
        generation: u32,
    },
}
