//! Board layout generation
//!
//! The board shows all 26 letters in a random order. Only display placement
//! is shuffled; the letter a player must tap next always follows
//! [`ALPHABET`] order.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::{
    constants::run::LETTER_COUNT,
    letter::{ALPHABET, Letter},
};

/// Display order of the tiles for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout([Letter; LETTER_COUNT]);

impl BoardLayout {
    /// Layout in alphabetical order
    pub fn ordered() -> Self {
        Self(ALPHABET)
    }

    /// Layout from an explicit tile order
    ///
    /// Returns `None` unless `tiles` contains every letter exactly once.
    pub fn from_tiles(tiles: [Letter; LETTER_COUNT]) -> Option<Self> {
        let layout = Self(tiles);
        layout.is_permutation().then_some(layout)
    }

    /// Checks that every letter appears exactly once
    pub fn is_permutation(&self) -> bool {
        let mut seen: EnumMap<Letter, bool> = EnumMap::default();
        for letter in self.0 {
            if std::mem::replace(&mut seen[letter], true) {
                return false;
            }
        }
        seen.values().all(|present| *present)
    }

    /// Tiles in display order
    pub fn tiles(&self) -> &[Letter] {
        &self.0
    }
}

/// Generates a fresh layout with the thread-local generator
pub fn shuffle() -> BoardLayout {
    shuffle_with(&mut fastrand::Rng::new())
}

/// Generates a fresh layout with an explicit generator
///
/// Fisher-Yates: walking down from the last slot, each slot is swapped with a
/// uniformly chosen slot at or below it.
pub fn shuffle_with(rng: &mut fastrand::Rng) -> BoardLayout {
    let mut tiles = ALPHABET;
    for i in (1..tiles.len()).rev() {
        tiles.swap(i, rng.usize(..=i));
    }
    BoardLayout(tiles)
}

/// Letter the player must tap after `expected_index` correct taps
///
/// Returns `None` once the whole alphabet has been matched.
pub fn expected_letter(expected_index: usize) -> Option<Letter> {
    ALPHABET.get(expected_index).copied()
}
