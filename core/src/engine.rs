use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Idle -> Active
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    #[default]
    Idle,
    Active,
    Won,
    Lost,
}

impl RoundState {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Reached the bottom row with too few points.
    BelowRequiredScore,
    /// No legal continuation exists.
    Stuck,
    /// The countdown ran out.
    TimeUp,
}

/// Outcome of selecting a tile
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The move was illegal and ignored.
    NoChange,
    Extended,
    Won,
    Lost(LossReason),
}

impl SelectOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn ends_round(self) -> bool {
        matches!(self, Self::Won | Self::Lost(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running { seconds_left: u32 },
    TimeUp,
}

/// Cues for the last seconds of a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWarning {
    /// Ten seconds left.
    Low,
    /// Five seconds or fewer left.
    Critical,
}

impl TimeWarning {
    pub const fn for_seconds_left(seconds_left: u32) -> Option<Self> {
        match seconds_left {
            10 => Some(Self::Low),
            1..=5 => Some(Self::Critical),
            _ => None,
        }
    }
}

/// One round: a board, the player's selected path and the countdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    params: RoundParameters,
    board: Board,
    selected: Vec<Tile>,
    round_score: Score,
    required_score: Score,
    time_left: u32,
    state: RoundState,
    loss_reason: Option<LossReason>,
}

impl Round {
    /// Takes a snapshot of `params`: later difficulty changes do not affect this round.
    pub fn new(board: Board, params: &RoundParameters) -> Self {
        Self {
            params: params.clone(),
            board,
            selected: Vec::new(),
            round_score: 0,
            required_score: params.min_round_score,
            time_left: params.round_time,
            state: RoundState::Idle,
            loss_reason: None,
        }
    }

    pub fn params(&self) -> &RoundParameters {
        &self.params
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn loss_reason(&self) -> Option<LossReason> {
        self.loss_reason
    }

    pub fn selected_path(&self) -> &[Tile] {
        &self.selected
    }

    pub fn round_score(&self) -> Score {
        self.round_score
    }

    pub fn required_score(&self) -> Score {
        self.required_score
    }

    /// Points still needed, zero once the requirement is met.
    pub fn points_missing(&self) -> Score {
        self.required_score.saturating_sub(self.round_score)
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn start(&mut self) -> Result<()> {
        if self.state != RoundState::Idle {
            return Err(GameError::InvalidAction);
        }
        self.state = RoundState::Active;
        Ok(())
    }

    pub fn is_selected(&self, pos: Position) -> bool {
        self.selected.iter().any(|tile| tile.pos == pos)
    }

    /// Whether `pos` may extend the selected path. Ignores the round state.
    pub fn is_legal_move(&self, pos: Position) -> bool {
        if self.board.validate_coords(pos).is_err() || self.is_selected(pos) {
            return false;
        }

        match self.selected.as_slice() {
            [] => pos.row == 0,
            // the first step may go either way, it sets up the alternation
            [last] => {
                self.board[pos] >= last.value
                    && (pos.row == last.pos.row || pos.col == last.pos.col)
            }
            [.., prev, last] => {
                self.board[pos] >= last.value
                    && match MoveKind::between(prev.pos, last.pos) {
                        Some(MoveKind::Horizontal) => pos.col == last.pos.col,
                        Some(MoveKind::Vertical) => pos.row == last.pos.row,
                        None => false,
                    }
            }
        }
    }

    /// Every legal next position in row-major order, empty once the round is over.
    pub fn legal_moves(&self) -> Vec<Position> {
        if self.state.is_finished() {
            return Vec::new();
        }
        self.board
            .positions()
            .filter(|&pos| self.is_legal_move(pos))
            .collect()
    }

    /// Score the path would have with `pos` appended, if that move is legal.
    pub fn preview_score(&self, pos: Position) -> Option<Score> {
        self.is_legal_move(pos).then(|| {
            path_score(
                self.selected
                    .iter()
                    .map(|tile| tile.value)
                    .chain(core::iter::once(self.board[pos])),
            )
        })
    }

    pub fn select(&mut self, pos: Position) -> Result<SelectOutcome> {
        let pos = self.board.validate_coords(pos)?;
        self.check_active()?;

        if !self.is_legal_move(pos) {
            log::trace!("Ignoring illegal move to {:?}", pos);
            return Ok(SelectOutcome::NoChange);
        }

        self.selected.push(self.board.tile_at(pos));
        self.round_score = path_score(self.selected.iter().map(|tile| tile.value));
        log::debug!(
            "Selected {:?} ({}), score now {}",
            pos,
            self.board[pos],
            self.round_score
        );

        if pos.row == self.board.bottom_row() {
            return Ok(if self.round_score >= self.required_score {
                self.end_round(None)
            } else {
                self.end_round(Some(LossReason::BelowRequiredScore))
            });
        }

        if self.board.positions().all(|next| !self.is_legal_move(next)) {
            return Ok(self.end_round(Some(LossReason::Stuck)));
        }

        Ok(SelectOutcome::Extended)
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.check_active()?;

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.end_round(Some(LossReason::TimeUp));
            Ok(TickOutcome::TimeUp)
        } else {
            Ok(TickOutcome::Running {
                seconds_left: self.time_left,
            })
        }
    }

    fn end_round(&mut self, loss: Option<LossReason>) -> SelectOutcome {
        self.loss_reason = loss;
        match loss {
            None => {
                self.state = RoundState::Won;
                SelectOutcome::Won
            }
            Some(reason) => {
                self.state = RoundState::Lost;
                SelectOutcome::Lost(reason)
            }
        }
    }

    fn check_active(&self) -> Result<()> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(GameError::NotActive)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use ndarray::Array2;

    /// 4x4 board:
    /// ```text
    /// 1 2 9 1
    /// 3 3 1 1
    /// 4 4 5 1
    /// 1 6 1 7
    /// ```
    fn board() -> Board {
        let values = Array2::from_shape_vec(
            (4, 4),
            vec![1, 2, 9, 1, 3, 3, 1, 1, 4, 4, 5, 1, 1, 6, 1, 7],
        )
        .unwrap();
        Board::from_parts(
            values,
            &[Position::new(0, 1), Position::new(1, 1), Position::new(3, 1)],
        )
        .unwrap()
    }

    fn round(required: Score) -> Round {
        let params = RoundParameters {
            grid_width: 4,
            grid_height: 4,
            min_round_score: required,
            round_time: 3,
            ..RoundParameters::default()
        };
        let mut round = Round::new(board(), &params);
        round.start().unwrap();
        round
    }

    fn pos(row: Coord, col: Coord) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn first_move_must_be_on_top_row() {
        let round = round(10);
        assert!(round.is_legal_move(pos(0, 3)));
        assert!(!round.is_legal_move(pos(1, 0)));
        assert_eq!(
            round.legal_moves(),
            [pos(0, 0), pos(0, 1), pos(0, 2), pos(0, 3)]
        );
    }

    #[test]
    fn moves_must_not_decrease_or_repeat() {
        let mut round = round(10);
        assert_eq!(round.select(pos(0, 1)).unwrap(), SelectOutcome::Extended);

        assert!(!round.is_legal_move(pos(0, 1)));
        assert!(!round.is_legal_move(pos(0, 0)));
        assert!(round.is_legal_move(pos(0, 2)));
        assert!(round.is_legal_move(pos(1, 1)));
        assert_eq!(round.select(pos(0, 0)).unwrap(), SelectOutcome::NoChange);
        assert_eq!(round.selected_path().len(), 1);
    }

    #[test]
    fn moves_alternate_direction() {
        let mut round = round(10);
        round.select(pos(0, 1)).unwrap();
        round.select(pos(1, 1)).unwrap();

        // vertical step, so a horizontal one must follow
        assert_eq!(round.legal_moves(), [pos(1, 0)]);
        assert_eq!(round.select(pos(2, 1)).unwrap(), SelectOutcome::NoChange);
        assert_eq!(round.select(pos(1, 0)).unwrap(), SelectOutcome::Extended);

        // horizontal step, so a vertical one must follow
        assert_eq!(round.legal_moves(), [pos(2, 0)]);
    }

    #[test]
    fn score_is_sum_times_length() {
        let mut round = round(100);
        round.select(pos(0, 1)).unwrap();
        round.select(pos(1, 1)).unwrap();
        assert_eq!(round.round_score(), (2 + 3) * 2);
        assert_eq!(round.points_missing(), 90);
        assert_eq!(round.preview_score(pos(1, 0)), Some((2 + 3 + 3) * 3));
        assert_eq!(round.preview_score(pos(2, 1)), None);
    }

    #[test]
    fn bottom_row_boundary_decides_outcome() {
        // 2 -> 6 straight down: (2 + 6) * 2 = 16
        let mut won = round(16);
        won.select(pos(0, 1)).unwrap();
        assert_eq!(won.select(pos(3, 1)).unwrap(), SelectOutcome::Won);
        assert_eq!(won.state(), RoundState::Won);
        assert_eq!(won.loss_reason(), None);

        let mut lost = round(17);
        lost.select(pos(0, 1)).unwrap();
        assert_eq!(
            lost.select(pos(3, 1)).unwrap(),
            SelectOutcome::Lost(LossReason::BelowRequiredScore)
        );
        assert_eq!(lost.state(), RoundState::Lost);
        assert_eq!(lost.select(pos(3, 3)), Err(GameError::NotActive));
        assert!(lost.legal_moves().is_empty());
    }

    #[test]
    fn dead_end_loses_round() {
        let mut round = round(10);
        // 9 on the top row: nothing below or beside it is as large
        assert_eq!(
            round.select(pos(0, 2)).unwrap(),
            SelectOutcome::Lost(LossReason::Stuck)
        );
        assert_eq!(round.state(), RoundState::Lost);
    }

    #[test]
    fn countdown_forces_loss() {
        let mut round = round(10);
        round.select(pos(0, 1)).unwrap();

        assert_eq!(
            round.tick().unwrap(),
            TickOutcome::Running { seconds_left: 2 }
        );
        assert_eq!(
            round.tick().unwrap(),
            TickOutcome::Running { seconds_left: 1 }
        );
        assert_eq!(round.tick().unwrap(), TickOutcome::TimeUp);
        assert_eq!(round.loss_reason(), Some(LossReason::TimeUp));
        assert_eq!(round.tick(), Err(GameError::NotActive));
    }

    #[test]
    fn idle_round_rejects_moves() {
        let params = RoundParameters::default();
        let mut round = Round::new(board(), &params);
        assert_eq!(round.select(pos(0, 0)), Err(GameError::NotActive));
        assert_eq!(round.select(pos(9, 0)), Err(GameError::InvalidCoords));
        round.start().unwrap();
        assert_eq!(round.start(), Err(GameError::InvalidAction));
    }

    #[test]
    fn time_warnings_fire_at_ten_and_last_five() {
        assert_eq!(TimeWarning::for_seconds_left(11), None);
        assert_eq!(TimeWarning::for_seconds_left(10), Some(TimeWarning::Low));
        assert_eq!(TimeWarning::for_seconds_left(6), None);
        assert_eq!(TimeWarning::for_seconds_left(5), Some(TimeWarning::Critical));
        assert_eq!(TimeWarning::for_seconds_left(1), Some(TimeWarning::Critical));
        assert_eq!(TimeWarning::for_seconds_left(0), None);
    }
}
