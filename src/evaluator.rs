//! Tap matching and per-tile feedback
//!
//! [`evaluate`] decides whether a tap advances the run. [`Tiles`] keeps the
//! transient feedback shown on each tile: correct tiles stay lit for the rest
//! of the run, while incorrect taps flash once and clear themselves.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::{letter::Letter, sequencer::expected_letter};

/// Outcome of a single tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Whether the tapped letter was the expected one
    pub is_match: bool,
    /// Count of matched letters after this tap
    pub new_expected_index: usize,
}

/// Compares a tapped letter against the expected one
///
/// Wrong taps never move progress in either direction.
pub fn evaluate(tapped: Letter, expected_index: usize) -> Evaluation {
    if expected_letter(expected_index) == Some(tapped) {
        Evaluation {
            is_match: true,
            new_expected_index: expected_index + 1,
        }
    } else {
        Evaluation {
            is_match: false,
            new_expected_index: expected_index,
        }
    }
}

/// Visual state of a tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileStatus {
    /// Not yet matched
    #[default]
    Neutral,
    /// Matched in this run
    Correct,
    /// Recently tapped out of order
    Incorrect,
}

/// Feedback board for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tiles {
    status: EnumMap<Letter, TileStatus>,
    /// Bumped on every wrong tap so only the newest clear alarm applies
    #[serde(skip)]
    flash_generation: EnumMap<Letter, u32>,
}

impl Tiles {
    /// Current status of a tile
    pub fn status(&self, letter: Letter) -> TileStatus {
        self.status[letter]
    }

    /// Whether the tile was already matched this run
    pub fn is_correct(&self, letter: Letter) -> bool {
        matches!(self.status[letter], TileStatus::Correct)
    }

    /// Marks a tile as matched
    pub fn mark_correct(&mut self, letter: Letter) {
        self.status[letter] = TileStatus::Correct;
    }

    /// Starts (or restarts) the incorrect flash on a tile
    ///
    /// Returns the generation the matching clear request must present.
    /// Correct tiles are left untouched and return `None`.
    pub fn flash(&mut self, letter: Letter) -> Option<u32> {
        if self.is_correct(letter) {
            return None;
        }
        self.status[letter] = TileStatus::Incorrect;
        let generation = self.flash_generation[letter].wrapping_add(1);
        self.flash_generation[letter] = generation;
        Some(generation)
    }

    /// Ends a flash started with `generation`
    ///
    /// Returns `true` if the tile went back to neutral. Clears from an older
    /// flash, or for a tile that is no longer flashing, do nothing.
    pub fn clear_flash(&mut self, letter: Letter, generation: u32) -> bool {
        if self.status[letter] == TileStatus::Incorrect
            && self.flash_generation[letter] == generation
        {
            self.status[letter] = TileStatus::Neutral;
            true
        } else {
            false
        }
    }

    /// All tiles with their status, in alphabetical order
    pub fn iter(&self) -> impl Iterator<Item = (Letter, TileStatus)> + '_ {
        self.status.iter().map(|(letter, status)| (letter, *status))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::letter::ALPHABET;

    #[test]
    fn test_evaluate_match_advances_by_one() {
        assert_eq!(
            evaluate(Letter::A, 0),
            Evaluation {
                is_match: true,
                new_expected_index: 1
            }
        );
        assert_eq!(
            evaluate(Letter::Z, 25),
            Evaluation {
                is_match: true,
                new_expected_index: 26
            }
        );
    }

    #[test]
    fn test_evaluate_wrong_letter_keeps_index() {
        assert_eq!(
            evaluate(Letter::B, 0),
            Evaluation {
                is_match: false,
                new_expected_index: 0
            }
        );
    }

    #[test]
    fn test_evaluate_after_completion_never_matches() {
        for letter in ALPHABET {
            let evaluation = evaluate(letter, 26);
            assert!(!evaluation.is_match);
            assert_eq!(evaluation.new_expected_index, 26);
        }
    }

    #[test]
    fn test_evaluate_only_expected_letter_matches() {
        for index in 0..26 {
            let matches = ALPHABET
                .iter()
                .filter(|letter| evaluate(**letter, index).is_match)
                .count();
            assert_eq!(matches, 1);
        }
    }

    #[test]
    fn test_tiles_default_neutral() {
        let tiles = Tiles::default();
        assert!(tiles.iter().all(|(_, status)| status == TileStatus::Neutral));
    }

    #[test]
    fn test_flash_then_clear() {
        let mut tiles = Tiles::default();
        let generation = tiles.flash(Letter::B).unwrap();
        assert_eq!(tiles.status(Letter::B), TileStatus::Incorrect);

        assert!(tiles.clear_flash(Letter::B, generation));
        assert_eq!(tiles.status(Letter::B), TileStatus::Neutral);
    }

    #[test]
    fn test_reflash_restarts_single_window() {
        let mut tiles = Tiles::default();
        let first = tiles.flash(Letter::C).unwrap();
        let second = tiles.flash(Letter::C).unwrap();
        assert_ne!(first, second);

        // the first window's clear arrives but the second flash is still running
        assert!(!tiles.clear_flash(Letter::C, first));
        assert_eq!(tiles.status(Letter::C), TileStatus::Incorrect);

        assert!(tiles.clear_flash(Letter::C, second));
        assert_eq!(tiles.status(Letter::C), TileStatus::Neutral);

        // nothing left to clear
        assert!(!tiles.clear_flash(Letter::C, second));
    }

    #[test]
    fn test_correct_tile_never_flashes() {
        let mut tiles = Tiles::default();
        tiles.mark_correct(Letter::A);
        assert_eq!(tiles.flash(Letter::A), None);
        assert!(tiles.is_correct(Letter::A));
    }

    #[test]
    fn test_correct_tile_ignores_stale_clear() {
        let mut tiles = Tiles::default();
        let generation = tiles.flash(Letter::A).unwrap();
        tiles.mark_correct(Letter::A);
        assert!(!tiles.clear_flash(Letter::A, generation));
        assert_eq!(tiles.status(Letter::A), TileStatus::Correct);
    }
}
