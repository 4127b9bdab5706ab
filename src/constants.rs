//! Configuration constants for the A→Z rush game
//!
//! This module contains the fixed limits and default timings used by the
//! state machine, the run timer, and the leaderboard clients.

/// Alphabet and run constants
pub mod run {
    /// Number of letters a player must tap to finish a run
    pub const LETTER_COUNT: usize = 26;
    /// Largest `letters_completed` a score record may carry
    pub const MAX_LETTERS_COMPLETED: u8 = 26;
}

/// Countdown configuration constants
pub mod countdown {
    /// Number the countdown starts from by default
    pub const DEFAULT_FROM: u8 = 3;
    /// Largest number a countdown may start from
    pub const MAX_FROM: u8 = 10;
    /// Default time between two countdown steps, in milliseconds
    pub const DEFAULT_STEP_MS: u64 = 1000;
    /// Minimum time between two countdown steps, in milliseconds
    pub const MIN_STEP_MS: u64 = 100;
    /// Maximum time between two countdown steps, in milliseconds
    pub const MAX_STEP_MS: u64 = 5000;
}

/// Run timer configuration constants
pub mod timer {
    /// Default display refresh cadence while playing, in milliseconds
    pub const DEFAULT_TICK_MS: u64 = 50;
    /// Minimum display refresh cadence, in milliseconds
    pub const MIN_TICK_MS: u64 = 10;
    /// Maximum display refresh cadence, in milliseconds
    pub const MAX_TICK_MS: u64 = 1000;
}

/// Incorrect tap feedback configuration constants
pub mod flash {
    /// Default duration of the incorrect flash on a tile, in milliseconds
    pub const DEFAULT_MS: u64 = 400;
    /// Minimum duration of the incorrect flash, in milliseconds
    pub const MIN_MS: u64 = 100;
    /// Maximum duration of the incorrect flash, in milliseconds
    pub const MAX_MS: u64 = 2000;
}

/// Leaderboard configuration constants
pub mod leaderboard {
    /// Maximum number of rows a leaderboard query may return
    pub const MAX_LIMIT: usize = 50;
}

/// Player identifier configuration constants
pub mod identity {
    /// Identifier used when no usable host identity is available
    pub const ANONYMOUS: &str = "anonymous";
    /// Maximum length of a player identifier in characters
    pub const MAX_LENGTH: usize = 30;
}
