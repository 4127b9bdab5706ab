//! The target alphabet
//!
//! A run is a race through [`ALPHABET`] in order. [`Letter`] is the
//! strongly-typed tile value, usable as an [`enum_map::EnumMap`] key so
//! per-tile state never needs a hash map.

use std::{fmt::Display, str::FromStr};

use enum_map::Enum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::run::LETTER_COUNT;

/// One of the 26 tappable letters
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, Serialize, Deserialize,
)]
#[allow(missing_docs)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

/// The fixed target sequence, A through Z
pub const ALPHABET: [Letter; LETTER_COUNT] = {
    use Letter::*;
    [
        A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    ]
};

/// Error returned when a character is not a latin letter
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[error("not a letter between A and Z")]
pub struct ParseLetterError;

impl Letter {
    /// Position of this letter in [`ALPHABET`]
    pub fn index(self) -> usize {
        self.into_usize()
    }

    /// Uppercase character for this letter
    pub fn as_char(self) -> char {
        char::from(b'A' + self.index() as u8)
    }
}

impl TryFrom<char> for Letter {
    type Error = ParseLetterError;

    /// Accepts either case, so keyboard input maps onto tiles directly
    fn try_from(c: char) -> Result<Self, Self::Error> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(ALPHABET[usize::from(upper as u8 - b'A')])
        } else {
            Err(ParseLetterError)
        }
    }
}

impl FromStr for Letter {
    type Err = ParseLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::try_from(c),
            _ => Err(ParseLetterError),
        }
    }
}

impl Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
