use alloc::vec::Vec;
use hashbrown::HashSet;
use rand::prelude::*;
use smallvec::SmallVec;

use crate::*;

type Candidates = SmallVec<[Position; 16]>;

/// Move kinds for a path of `length` tiles.
///
/// Moves alternate, starting horizontal when the move count is even and vertical when it is odd,
/// so the last move is always vertical and can land on the bottom row.
pub fn move_pattern(length: usize) -> Vec<MoveKind> {
    let moves = length.saturating_sub(1);
    let first = if moves % 2 == 0 {
        MoveKind::Horizontal
    } else {
        MoveKind::Vertical
    };
    core::iter::successors(Some(first), |kind| Some(kind.flipped()))
        .take(moves)
        .collect()
}

/// Whether a vertical move onto `row` can still reach the bottom of a `grid_height` grid with
/// `remaining_vertical` vertical moves left, each descending at least one row.
pub const fn is_row_feasible(row: Coord, remaining_vertical: usize, grid_height: Coord) -> bool {
    row as usize + remaining_vertical >= grid_height as usize - 1
}

/// One level of the depth-first search: shuffled targets for a single move.
struct Frame {
    candidates: Candidates,
    next: usize,
}

impl Frame {
    fn next_candidate(&mut self) -> Option<Position> {
        let candidate = self.candidates.get(self.next).copied();
        self.next += 1;
        candidate
    }
}

struct PathSearch<'a> {
    pattern: &'a [MoveKind],
    /// `remaining_vertical[i]`: vertical moves in `pattern[i + 1..]`.
    remaining_vertical: Vec<usize>,
    width: Coord,
    height: Coord,
    bottom_row: Coord,
}

impl<'a> PathSearch<'a> {
    fn new(pattern: &'a [MoveKind], params: &RoundParameters) -> Self {
        let mut remaining_vertical = alloc::vec![0; pattern.len()];
        let mut count = 0;
        for (index, kind) in pattern.iter().enumerate().rev() {
            remaining_vertical[index] = count;
            if *kind == MoveKind::Vertical {
                count += 1;
            }
        }
        Self {
            pattern,
            remaining_vertical,
            width: params.grid_width,
            height: params.grid_height,
            bottom_row: params.bottom_row(),
        }
    }

    fn frame<R>(
        &self,
        rng: &mut R,
        from: Position,
        move_index: usize,
        visited: &HashSet<Position>,
    ) -> Frame
    where
        R: Rng + ?Sized,
    {
        let mut candidates: Candidates = match self.pattern[move_index] {
            MoveKind::Horizontal => (0..self.width)
                .filter(|&col| col != from.col)
                .map(|col| Position::new(from.row, col))
                .collect(),
            MoveKind::Vertical => (0..self.height)
                .filter(|&row| row != from.row)
                .filter(|&row| {
                    is_row_feasible(row, self.remaining_vertical[move_index], self.height)
                })
                .map(|row| Position::new(row, from.col))
                .collect(),
        };
        candidates.retain(|pos| !visited.contains(pos));
        candidates.shuffle(rng);
        Frame {
            candidates,
            next: 0,
        }
    }

    /// Randomized backtracking from `start` with an explicit stack of frames.
    ///
    /// While a frame is on top, `path.len() == stack.len()`: the path holds the tiles placed
    /// before the move that frame is choosing.
    fn run<R>(&self, rng: &mut R, start: Position) -> Option<Vec<Position>>
    where
        R: Rng + ?Sized,
    {
        let moves = self.pattern.len();
        let mut path = Vec::with_capacity(moves + 1);
        let mut visited = HashSet::with_capacity(moves + 1);
        path.push(start);
        visited.insert(start);

        if moves == 0 {
            return (start.row == self.bottom_row).then_some(path);
        }

        let mut stack: Vec<Frame> = Vec::with_capacity(moves);
        stack.push(self.frame(rng, start, 0, &visited));

        while let Some(top) = stack.last_mut() {
            let Some(candidate) = top.next_candidate() else {
                stack.pop();
                if stack.is_empty() {
                    return None;
                }
                if let Some(abandoned) = path.pop() {
                    visited.remove(&abandoned);
                }
                continue;
            };

            let at_bottom = candidate.row == self.bottom_row;
            let placed_moves = path.len();
            if placed_moves == moves {
                if at_bottom {
                    path.push(candidate);
                    return Some(path);
                }
                continue;
            }
            // reaching the bottom early ends the round before the path is complete
            if at_bottom {
                continue;
            }

            path.push(candidate);
            visited.insert(candidate);
            let frame = self.frame(rng, candidate, placed_moves, &visited);
            stack.push(frame);
        }

        None
    }
}

/// Lays out `length` positions from the top row to the bottom row with strictly alternating
/// horizontal and vertical moves and no repeated position.
pub fn generate_winning_path_layout<R>(
    rng: &mut R,
    length: usize,
    params: &RoundParameters,
) -> Result<Vec<Position>>
where
    R: Rng + ?Sized,
{
    params.validate()?;
    let pattern = move_pattern(length);
    let search = PathSearch::new(&pattern, params);

    for attempt in 0..params.max_path_attempts {
        let start = Position::new(0, rng.random_range(0..params.grid_width));
        if let Some(path) = search.run(rng, start) {
            log::trace!(
                "Winning path of length {} found after {} attempts: {:?}",
                length,
                attempt + 1,
                path
            );
            return Ok(path);
        }
    }

    log::warn!(
        "Unable to lay out a path of length {} on a {}x{} grid within {} attempts",
        length,
        params.grid_width,
        params.grid_height,
        params.max_path_attempts
    );
    Err(GameError::GenerationExhausted {
        stage: GenerationStage::PathLayout,
        attempts: params.max_path_attempts,
    })
}
