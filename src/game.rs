//! Core game logic and state management
//!
//! This module contains the game state machine. A game moves from idle,
//! through a short countdown, into play, and finally to a finished run whose
//! score may be submitted. All timing is driven by alarms the host delivers
//! back through [`Game::receive_alarm`]; all output goes through a
//! [`Tunnel`].

use std::fmt::Debug;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::Duration;

use crate::{
    constants::{countdown, flash, timer},
    evaluator::TileStatus,
    identity::IdentityProvider,
    leaderboard::{ScoreRecord, ServiceError},
    letter::Letter,
    run::{Run, RunId, SubmissionStatus, TapOutcome},
    sequencer::BoardLayout,
    session::{Clock, SystemClock, Tunnel},
    submission,
};

use super::AlarmMessage;

/// Validates that a duration falls within bounds given in milliseconds
///
/// # Errors
///
/// Returns a `garde::Error` if the duration is outside `[MIN_MS, MAX_MS]`.
pub fn validate_millis<const MIN_MS: u64, const MAX_MS: u64>(
    val: &Duration,
    _ctx: &(),
) -> garde::Result {
    if (u128::from(MIN_MS)..=u128::from(MAX_MS)).contains(&val.as_millis()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{MIN_MS}ms,{MAX_MS}ms]",
        )))
    }
}

/// Timing options for a game
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Number the countdown starts from, zero skips it
    #[garde(range(max = countdown::MAX_FROM))]
    pub countdown_from: u8,
    /// Time between two countdown numbers
    #[garde(custom(validate_millis::<{ countdown::MIN_STEP_MS }, { countdown::MAX_STEP_MS }>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub countdown_step: Duration,
    /// Refresh cadence of the elapsed time display
    #[garde(custom(validate_millis::<{ timer::MIN_TICK_MS }, { timer::MAX_TICK_MS }>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub tick_interval: Duration,
    /// How long an incorrect tap stays visible
    #[garde(custom(validate_millis::<{ flash::MIN_MS }, { flash::MAX_MS }>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub flash_duration: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            countdown_from: countdown::DEFAULT_FROM,
            countdown_step: Duration::from_millis(countdown::DEFAULT_STEP_MS),
            tick_interval: Duration::from_millis(timer::DEFAULT_TICK_MS),
            flash_duration: Duration::from_millis(flash::DEFAULT_MS),
        }
    }
}

/// Represents the current phase of the game
#[derive(Debug, Clone)]
pub enum State {
    /// Nothing running, waiting for the player to start
    Idle,
    /// Counting down before play
    Countdown {
        /// Id the run will get once play begins
        run: RunId,
        /// Number currently shown
        remaining: u8,
    },
    /// Accepting taps
    Playing(Box<Run>),
    /// Every letter matched, elapsed time frozen
    Finished(Box<Run>),
}

/// The phase of the game without associated data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// See [`State::Idle`]
    Idle,
    /// See [`State::Countdown`]
    Countdown,
    /// See [`State::Playing`]
    Playing,
    /// See [`State::Finished`]
    Finished,
}

impl State {
    /// Returns the phase of this state
    pub fn phase(&self) -> Phase {
        match self {
            State::Idle => Phase::Idle,
            State::Countdown { .. } => Phase::Countdown,
            State::Playing(_) => Phase::Playing,
            State::Finished(_) => Phase::Finished,
        }
    }
}

/// Player actions
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum IncomingMessage {
    /// Start a run from the idle screen
    Start,
    /// A tile was tapped
    Tap(Letter),
    /// Start a new run from the finish screen
    PlayAgain,
    /// Leave to the idle screen, abandoning any run
    GoBack,
}

/// Update messages sent to the view about game changes
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// Back on the idle screen
    Idle,
    /// Countdown number to show, zero as play begins
    Countdown(u8),
    /// Play began on a fresh board
    Started {
        /// Tile display order
        layout: BoardLayout,
        /// Letter to tap first
        expected: Option<Letter>,
    },
    /// Elapsed time refresh
    Elapsed(#[serde_as(as = "serde_with::DurationMilliSeconds<u64>")] Duration),
    /// A tile changed appearance
    Tile {
        /// The tile
        letter: Letter,
        /// Its new status
        status: TileStatus,
    },
    /// A correct tap moved progress forward
    Progress {
        /// Count of matched letters
        expected_index: usize,
        /// Letter to tap next
        expected: Option<Letter>,
    },
    /// Every letter matched
    Finished {
        /// Final elapsed time
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        elapsed: Duration,
    },
    /// The score is being sent
    SubmissionPending,
    /// The leaderboard stored the score
    Submitted,
    /// The score was not stored and may be retried
    SubmissionFailed(submission::Error),
}

/// Sync messages describing the whole view
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Idle screen
    Idle,
    /// Countdown number currently shown
    Countdown(u8),
    /// Play in progress
    Playing {
        /// Tile display order
        layout: BoardLayout,
        /// Status of every tile, alphabetical
        tiles: Vec<(Letter, TileStatus)>,
        /// Count of matched letters
        expected_index: usize,
        /// Letter to tap next
        expected: Option<Letter>,
        /// Latest elapsed time
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        elapsed: Duration,
    },
    /// Finish screen
    Finished {
        /// Final elapsed time
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        elapsed: Duration,
        /// Where the score stands with the leaderboard
        submission: SubmissionStatus,
    },
}

/// The game state machine for one player session
pub struct Game<C = SystemClock> {
    /// Current phase and run
    state: State,
    /// Timing options
    options: Options,
    /// Time source for the run timer
    clock: C,
}

impl<C> Debug for Game<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.state.phase())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> Game<C> {
    /// Creates a game in the idle phase
    ///
    /// # Errors
    ///
    /// Returns the validation report if `options` are out of bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use azrush::game::{Game, Options, Phase};
    /// use azrush::session::SystemClock;
    ///
    /// let game = Game::new(Options::default(), SystemClock).unwrap();
    /// assert_eq!(game.phase(), Phase::Idle);
    /// ```
    pub fn new(options: Options, clock: C) -> Result<Self, garde::Report> {
        options.validate()?;
        Ok(Self {
            state: State::Idle,
            options,
            clock,
        })
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Run being played or just finished
    pub fn run(&self) -> Option<&Run> {
        match &self.state {
            State::Playing(run) | State::Finished(run) => Some(run),
            State::Idle | State::Countdown { .. } => None,
        }
    }

    /// Options the game was created with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replaces the state, releasing the tick of an outgoing run
    fn transition(&mut self, next: impl FnOnce(State) -> State) {
        let mut previous = std::mem::replace(&mut self.state, State::Idle);
        let from = previous.phase();
        if let State::Playing(run) = &mut previous {
            run.timer_mut().cancel();
        }
        self.state = next(previous);
        log::debug!("game phase {from:?} -> {:?}", self.state.phase());
    }

    /// Begins a countdown for a new run
    fn start_countdown<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        let run = RunId::new();
        let remaining = self.options.countdown_from;

        if remaining == 0 {
            self.begin_play(run, schedule_message, tunnel);
            return;
        }

        self.transition(|_| State::Countdown { run, remaining });
        tunnel.send_message(&UpdateMessage::Countdown(remaining).into());
        schedule_message(
            AlarmMessage::Countdown {
                run,
                remaining: remaining - 1,
            },
            self.options.countdown_step,
        );
    }

    /// Creates the run, starts its timer and schedules the first tick
    fn begin_play<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        id: RunId,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        let run = Run::start(id, self.clock.now());

        tunnel.send_message(&UpdateMessage::Countdown(0).into());
        tunnel.send_message(
            &UpdateMessage::Started {
                layout: *run.layout(),
                expected: run.expected_letter(),
            }
            .into(),
        );

        self.transition(|_| State::Playing(Box::new(run)));

        schedule_message(AlarmMessage::Tick { run: id }, self.options.tick_interval);
    }

    /// Moves a completed run to the finished phase
    fn finish<T: Tunnel>(&mut self, elapsed: Duration, tunnel: &T) {
        self.transition(|state| match state {
            State::Playing(run) => State::Finished(run),
            other => other,
        });

        tunnel.send_message(&UpdateMessage::Finished { elapsed }.into());
    }

    /// Leaves to the idle phase, discarding any countdown or run
    fn go_back<T: Tunnel>(&mut self, tunnel: &T) {
        self.transition(|_| State::Idle);
        tunnel.send_message(&UpdateMessage::Idle.into());
    }

    /// Applies a tap to the run being played
    fn tap<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        letter: Letter,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        let State::Playing(run) = &mut self.state else {
            return;
        };

        let outcome = run.tap(letter, self.clock.now());
        let run_id = run.id();
        let expected_index = run.expected_index();
        let expected = run.expected_letter();

        match outcome {
            Ok(TapOutcome::Ignored) => {}
            Ok(TapOutcome::Matched { .. }) => {
                tunnel.send_message(
                    &UpdateMessage::Tile {
                        letter,
                        status: TileStatus::Correct,
                    }
                    .into(),
                );
                tunnel.send_message(
                    &UpdateMessage::Progress {
                        expected_index,
                        expected,
                    }
                    .into(),
                );
            }
            Ok(TapOutcome::Flashed { generation }) => {
                tunnel.send_message(
                    &UpdateMessage::Tile {
                        letter,
                        status: TileStatus::Incorrect,
                    }
                    .into(),
                );
                schedule_message(
                    AlarmMessage::ClearFlash {
                        run: run_id,
                        letter,
                        generation,
                    },
                    self.options.flash_duration,
                );
            }
            Ok(TapOutcome::Completed { elapsed }) => {
                tunnel.send_message(
                    &UpdateMessage::Tile {
                        letter,
                        status: TileStatus::Correct,
                    }
                    .into(),
                );
                self.finish(elapsed, tunnel);
            }
            Err(e) => {
                log::error!("run {run_id} aborted: {e}");
                self.go_back(tunnel);
            }
        }
    }

    /// Handles player actions
    ///
    /// Actions that make no sense in the current phase are ignored.
    ///
    /// # Arguments
    ///
    /// * `message` - The player action
    /// * `schedule_message` - Asks the host to deliver an alarm after a delay
    /// * `tunnel` - Where view updates are sent
    pub fn receive_message<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: IncomingMessage,
        schedule_message: S,
        tunnel: &T,
    ) {
        match (message, &self.state) {
            (IncomingMessage::Start, State::Idle)
            | (IncomingMessage::PlayAgain, State::Finished(_)) => {
                self.start_countdown(schedule_message, tunnel);
            }
            (IncomingMessage::Tap(letter), State::Playing(_)) => {
                self.tap(letter, schedule_message, tunnel);
            }
            (
                IncomingMessage::GoBack,
                State::Countdown { .. } | State::Playing(_) | State::Finished(_),
            ) => {
                self.go_back(tunnel);
            }
            _ => {}
        }
    }

    /// Handles alarms previously requested through `schedule_message`
    ///
    /// Alarms scheduled for a countdown or run that is no longer current are
    /// dropped, which is what keeps a single tick alive across rapid restarts.
    pub fn receive_alarm<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: AlarmMessage,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        match message {
            AlarmMessage::Countdown { run, remaining } => match &mut self.state {
                State::Countdown {
                    run: current,
                    remaining: shown,
                } if *current == run => {
                    if remaining == 0 {
                        self.begin_play(run, schedule_message, tunnel);
                    } else {
                        *shown = remaining;
                        tunnel.send_message(&UpdateMessage::Countdown(remaining).into());
                        schedule_message(
                            AlarmMessage::Countdown {
                                run,
                                remaining: remaining - 1,
                            },
                            self.options.countdown_step,
                        );
                    }
                }
                _ => (),
            },
            AlarmMessage::Tick { run } => match &mut self.state {
                State::Playing(current)
                    if current.id() == run && current.timer().owns_tick(run) =>
                {
                    let elapsed = current.timer_mut().sample(self.clock.now());
                    tunnel.send_message(&UpdateMessage::Elapsed(elapsed).into());
                    schedule_message(AlarmMessage::Tick { run }, self.options.tick_interval);
                }
                _ => (),
            },
            AlarmMessage::ClearFlash {
                run,
                letter,
                generation,
            } => match &mut self.state {
                State::Playing(current) if current.id() == run => {
                    if current.tiles_mut().clear_flash(letter, generation) {
                        tunnel.send_message(
                            &UpdateMessage::Tile {
                                letter,
                                status: TileStatus::Neutral,
                            }
                            .into(),
                        );
                    }
                }
                _ => (),
            },
        }
    }

    /// Starts submitting the finished run's score
    ///
    /// The game never waits on the leaderboard. The host sends the returned
    /// record on its own schedule and hands the answer back through
    /// [`Self::submission_result`], tagged with the returned run id. Taps,
    /// alarms and phase changes keep being handled in between.
    ///
    /// # Errors
    ///
    /// * `submission::Error::NotFinished` - there is no finished run
    /// * `submission::Error::AlreadySubmitted` - the view is told again that
    ///   the score is stored
    /// * `submission::Error::InFlight` - the earlier send is still pending
    /// * `submission::Error::Incomplete` / `submission::Error::Invalid` -
    ///   reported to the view as a failed submission
    pub fn begin_submission<I: IdentityProvider + ?Sized, T: Tunnel>(
        &mut self,
        identity: &I,
        tunnel: &T,
    ) -> Result<(RunId, ScoreRecord), submission::Error> {
        let State::Finished(run) = &mut self.state else {
            return Err(submission::Error::NotFinished);
        };

        match submission::begin(run, identity) {
            Ok(record) => {
                tunnel.send_message(&UpdateMessage::SubmissionPending.into());
                Ok((run.id(), record))
            }
            Err(e @ submission::Error::AlreadySubmitted) => {
                tunnel.send_message(&UpdateMessage::Submitted.into());
                Err(e)
            }
            Err(e @ submission::Error::InFlight) => Err(e),
            Err(e) => {
                tunnel.send_message(&UpdateMessage::SubmissionFailed(e.clone()).into());
                Err(e)
            }
        }
    }

    /// Applies the leaderboard's answer to a submission
    ///
    /// Answers for a run that is no longer on the finish screen, or that is
    /// not waiting for one, are dropped. After `Submitted` hosts usually
    /// refresh the board with
    /// [`LeaderboardClient::announce`](crate::leaderboard::LeaderboardClient::announce).
    pub fn submission_result<T: Tunnel>(
        &mut self,
        run: RunId,
        result: Result<(), ServiceError>,
        tunnel: &T,
    ) {
        match &mut self.state {
            State::Finished(current)
                if current.id() == run && current.submission() == SubmissionStatus::Pending =>
            {
                let message = match submission::complete(current, result) {
                    Ok(()) => UpdateMessage::Submitted,
                    Err(e) => UpdateMessage::SubmissionFailed(e),
                };
                tunnel.send_message(&message.into());
            }
            _ => log::debug!("dropping submission answer for stale run {run}"),
        }
    }

    /// Returns the message necessary to synchronize a view from scratch
    pub fn state_message(&self) -> super::SyncMessage {
        let message = match &self.state {
            State::Idle => SyncMessage::Idle,
            State::Countdown { remaining, .. } => SyncMessage::Countdown(*remaining),
            State::Playing(run) => SyncMessage::Playing {
                layout: *run.layout(),
                tiles: run.tiles().iter().collect(),
                expected_index: run.expected_index(),
                expected: run.expected_letter(),
                elapsed: run.timer().elapsed(),
            },
            State::Finished(run) => SyncMessage::Finished {
                elapsed: run.elapsed().unwrap_or_default(),
                submission: run.submission(),
            },
        };
        message.into()
    }

    /// Sends the full state to a (re)connected view
    pub fn update_session<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&self.state_message());
    }
}
