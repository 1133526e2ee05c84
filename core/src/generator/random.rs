use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::*;

/// How values are drawn for cells that are not on the winning path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecoyPolicy {
    /// Lower of two rolls, used on the top row.
    Low,
    /// Higher of two rolls, used on the bottom row.
    High,
    /// A single roll.
    Uniform,
}

impl DecoyPolicy {
    pub const fn for_row(row: Coord, grid_height: Coord) -> Self {
        if row == 0 {
            Self::Low
        } else if row + 1 == grid_height {
            Self::High
        } else {
            Self::Uniform
        }
    }

    pub fn sample<R>(self, rng: &mut R, params: &RoundParameters) -> TileValue
    where
        R: Rng + ?Sized,
    {
        let values = params.min_tile_value..=params.max_tile_value;
        let first = rng.random_range(values.clone());
        match self {
            Self::Uniform => first,
            Self::Low => first.min(rng.random_range(values)),
            Self::High => first.max(rng.random_range(values)),
        }
    }
}

/// Writes `sequence` along `layout` and fills every other cell with a row-biased decoy.
pub fn build_board<R>(
    rng: &mut R,
    sequence: &WinningSequence,
    layout: &[Position],
    params: &RoundParameters,
) -> Result<Board>
where
    R: Rng + ?Sized,
{
    if sequence.len() != layout.len() {
        return Err(GameError::InvalidBoardShape);
    }

    let shape: (usize, usize) = (params.grid_height.into(), params.grid_width.into());
    let mut cells: Array2<Option<TileValue>> = Array2::from_elem(shape, None);
    for (&pos, &value) in layout.iter().zip(sequence.as_slice()) {
        let cell = cells
            .get_mut(pos.to_nd_index())
            .ok_or(GameError::InvalidCoords)?;
        *cell = Some(value);
    }

    let values = Array2::from_shape_fn(shape, |(row, col)| {
        cells[[row, col]].unwrap_or_else(|| {
            // shape comes from Coord dimensions, so the row always fits
            DecoyPolicy::for_row(row as Coord, params.grid_height).sample(rng, params)
        })
    });

    Board::from_parts(values, layout)
}

/// Generation strategy that draws the sequence, the path layout and the decoys from a single
/// seeded RNG, so the same seed and parameters always produce the same board.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, required_score: Score, params: &RoundParameters) -> Result<Board> {
        params.validate()?;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let sequence = generate_winning_sequence(&mut rng, required_score, params)?;
        let layout = generate_winning_path_layout(&mut rng, sequence.len(), params)?;
        let board = build_board(&mut rng, &sequence, &layout, params)?;

        log::debug!(
            "Generated {}x{} board for score {} with a path of length {} (seed {})",
            params.grid_width,
            params.grid_height,
            required_score,
            sequence.len(),
            self.seed
        );
        Ok(board)
    }
}
