use alloc::vec::Vec;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Where the best total score lives between sessions.
pub trait HighScoreStore {
    fn load(&self) -> Score;
    fn save(&mut self, high_score: Score);
}

/// High score kept only for the lifetime of the value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryHighScore(pub Score);

impl HighScoreStore for MemoryHighScore {
    fn load(&self) -> Score {
        self.0
    }

    fn save(&mut self, high_score: Score) {
        self.0 = high_score;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won,
    Lost(LossReason),
}

/// Notifications for the view layer, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted {
        round_number: u32,
        required_score: Score,
        time_left: u32,
    },
    MoveAccepted {
        position: Position,
        new_score: Score,
    },
    RoundEnded {
        outcome: RoundOutcome,
        final_score: Score,
    },
    TimeTick {
        seconds_left: u32,
        warning: Option<TimeWarning>,
    },
    SolutionRevealed {
        path: Vec<Tile>,
    },
    HighScoreUpdated {
        high_score: Score,
    },
}

/// One line of the round history.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_number: u32,
    pub required_score: Score,
    pub achieved: Score,
    pub cumulative: Score,
    pub won: bool,
}

/// Counters that outlive a single round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub total_score: Score,
    pub round_number: u32,
    pub high_score: Score,
}

/// Drives rounds one after another and applies the difficulty progression between them.
#[derive(Debug)]
pub struct Session<S> {
    progression: Progression,
    params: RoundParameters,
    state: SessionState,
    round: Option<Round>,
    game_over: bool,
    solution_revealed: bool,
    history: Vec<RoundRecord>,
    seeds: SmallRng,
    store: S,
}

impl<S: HighScoreStore> Session<S> {
    pub fn new(progression: Progression, store: S, seed: u64) -> Self {
        let high_score = store.load();
        Self {
            params: progression.reset_difficulty(),
            progression,
            state: SessionState {
                total_score: 0,
                round_number: 1,
                high_score,
            },
            round: None,
            game_over: false,
            solution_revealed: false,
            history: Vec::new(),
            seeds: SmallRng::seed_from_u64(seed),
            store,
        }
    }

    pub fn params(&self) -> &RoundParameters {
        &self.params
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn round_state(&self) -> Option<RoundState> {
        self.round.as_ref().map(Round::state)
    }

    pub fn can_start(&self) -> bool {
        !self.game_over
            && matches!(
                self.round_state(),
                None | Some(RoundState::Idle) | Some(RoundState::Won)
            )
    }

    pub fn can_next_round(&self) -> bool {
        self.round_state() == Some(RoundState::Won)
    }

    pub fn can_stop(&self) -> bool {
        self.round_state() == Some(RoundState::Active)
    }

    pub fn can_reveal_solution(&self) -> bool {
        self.round_state() == Some(RoundState::Lost) && !self.solution_revealed
    }

    /// The winning path, once it has been revealed.
    pub fn revealed_solution(&self) -> Option<&[Tile]> {
        self.solution_revealed
            .then(|| self.round.as_ref().map(|round| round.board().winning_path()))
            .flatten()
    }

    /// Generates a board and starts a round with the current parameters.
    ///
    /// Generation failures leave the session untouched; the caller decides whether to retry.
    pub fn start_round(&mut self) -> Result<Vec<GameEvent>> {
        if !self.can_start() {
            return Err(GameError::InvalidAction);
        }

        let seed = self.seeds.next_u64();
        let required_score = self.params.min_round_score;
        let board = RandomBoardGenerator::new(seed).generate(required_score, &self.params)?;

        let mut round = Round::new(board, &self.params);
        round.start()?;
        log::info!(
            "Round {} started, {} points required in {}s",
            self.state.round_number,
            required_score,
            round.time_left()
        );

        let event = GameEvent::RoundStarted {
            round_number: self.state.round_number,
            required_score,
            time_left: round.time_left(),
        };
        self.round = Some(round);
        self.solution_revealed = false;
        Ok(alloc::vec![event])
    }

    pub fn next_round(&mut self) -> Result<Vec<GameEvent>> {
        if !self.can_next_round() {
            return Err(GameError::InvalidAction);
        }
        self.start_round()
    }

    /// Clears the score, round counter and difficulty, then starts a fresh round.
    pub fn restart(&mut self) -> Result<Vec<GameEvent>> {
        self.round = None;
        self.game_over = false;
        self.solution_revealed = false;
        self.history.clear();
        self.state.total_score = 0;
        self.state.round_number = 1;
        self.state.high_score = self.store.load();
        self.params = self.progression.reset_difficulty();
        log::info!("Session restarted");
        self.start_round()
    }

    /// Abandons the active round without scoring it. No-op otherwise.
    pub fn stop(&mut self) -> Vec<GameEvent> {
        if self.can_stop() {
            log::info!("Round {} stopped", self.state.round_number);
            self.round = None;
        }
        Vec::new()
    }

    pub fn select_tile(&mut self, pos: Position) -> Vec<GameEvent> {
        let Some(round) = self.round.as_mut() else {
            return Vec::new();
        };

        let outcome = match round.select(pos) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("Ignoring selection of {:?}: {}", pos, err);
                return Vec::new();
            }
        };
        if !outcome.has_update() {
            return Vec::new();
        }

        let mut events = alloc::vec![GameEvent::MoveAccepted {
            position: pos,
            new_score: round.round_score(),
        }];
        match outcome {
            SelectOutcome::Won => self.finish_round(RoundOutcome::Won, &mut events),
            SelectOutcome::Lost(reason) => {
                self.finish_round(RoundOutcome::Lost(reason), &mut events)
            }
            SelectOutcome::Extended | SelectOutcome::NoChange => {}
        }
        events
    }

    /// One second of the round countdown.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let Some(round) = self.round.as_mut() else {
            return Vec::new();
        };

        match round.tick() {
            Ok(TickOutcome::Running { seconds_left }) => alloc::vec![GameEvent::TimeTick {
                seconds_left,
                warning: TimeWarning::for_seconds_left(seconds_left),
            }],
            Ok(TickOutcome::TimeUp) => {
                let mut events = alloc::vec![GameEvent::TimeTick {
                    seconds_left: 0,
                    warning: None,
                }];
                self.finish_round(RoundOutcome::Lost(LossReason::TimeUp), &mut events);
                events
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn reveal_solution(&mut self) -> Vec<GameEvent> {
        if !self.can_reveal_solution() {
            return Vec::new();
        }
        self.solution_revealed = true;
        self.revealed_solution()
            .map(|path| GameEvent::SolutionRevealed {
                path: path.to_vec(),
            })
            .into_iter()
            .collect()
    }

    fn finish_round(&mut self, outcome: RoundOutcome, events: &mut Vec<GameEvent>) {
        let Some(round) = self.round.as_ref() else {
            return;
        };
        let final_score = round.round_score();
        let required_score = round.required_score();
        let won = outcome == RoundOutcome::Won;

        if won {
            self.state.total_score = self.state.total_score.saturating_add(final_score);
        }
        self.history.push(RoundRecord {
            round_number: self.state.round_number,
            required_score,
            achieved: final_score,
            cumulative: self.state.total_score,
            won,
        });

        if won {
            self.state.round_number += 1;
            self.params = self
                .progression
                .update_difficulty(self.state.round_number, &self.params);
        } else {
            self.game_over = true;
        }
        log::info!(
            "Round ended {:?} with {} of {} points, total {}",
            outcome,
            final_score,
            required_score,
            self.state.total_score
        );
        events.push(GameEvent::RoundEnded {
            outcome,
            final_score,
        });

        if self.state.total_score > self.state.high_score {
            self.state.high_score = self.state.total_score;
            self.store.save(self.state.high_score);
            events.push(GameEvent::HighScoreUpdated {
                high_score: self.state.high_score,
            });
        }
    }
}
