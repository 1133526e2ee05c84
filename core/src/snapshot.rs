use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Read-only view of a session for the rendering layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub params: RoundParameters,
    pub session: SessionState,
    pub game_over: bool,
    pub round: Option<RoundSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub state: RoundState,
    pub loss_reason: Option<LossReason>,
    pub values: Array2<TileValue>,
    pub selected: Vec<Tile>,
    pub legal_moves: Vec<Position>,
    pub round_score: Score,
    pub required_score: Score,
    pub points_missing: Score,
    pub time_left: u32,
    /// Only filled in after the solution was revealed.
    pub solution: Option<Vec<Tile>>,
}

impl RoundSnapshot {
    pub fn from_round(round: &Round) -> Self {
        Self {
            state: round.state(),
            loss_reason: round.loss_reason(),
            values: round.board().values().clone(),
            selected: round.selected_path().to_vec(),
            legal_moves: round.legal_moves(),
            round_score: round.round_score(),
            required_score: round.required_score(),
            points_missing: round.points_missing(),
            time_left: round.time_left(),
            solution: None,
        }
    }

    /// The requirement is met, shown as "Breached!" by the UI.
    pub fn is_breached(&self) -> bool {
        self.points_missing == 0
    }
}

impl Snapshot {
    pub fn from_session<S: HighScoreStore>(session: &Session<S>) -> Self {
        let round = session.round().map(|round| RoundSnapshot {
            solution: session.revealed_solution().map(<[Tile]>::to_vec),
            ..RoundSnapshot::from_round(round)
        });
        Self {
            params: session.params().clone(),
            session: session.state(),
            game_over: session.is_game_over(),
            round,
        }
    }
}
