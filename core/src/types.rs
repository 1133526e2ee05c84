use serde::{Deserialize, Serialize};

/// Single coordinate axis used for grid width, height, rows and columns.
pub type Coord = u8;

/// Number printed on a tile.
pub type TileValue = u8;

/// Round, total and required scores.
pub type Score = u32;

/// A cell on the grid, `row` 0 is the top row.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub row: Coord,
    pub col: Coord,
}

impl Position {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Position {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.row.into(), self.col.into()]
    }
}

/// A position together with the value printed on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub pos: Position,
    pub value: TileValue,
}

impl Tile {
    pub const fn new(pos: Position, value: TileValue) -> Self {
        Self { pos, value }
    }
}

/// Direction of a single step along a path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Same row, column changes.
    Horizontal,
    /// Same column, row changes (up or down).
    Vertical,
}

impl MoveKind {
    /// Classifies the step `from -> to`, `None` if it is neither a row nor a column move.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        if from == to {
            None
        } else if from.row == to.row {
            Some(Self::Horizontal)
        } else if from.col == to.col {
            Some(Self::Vertical)
        } else {
            None
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Score of a chain of tiles: the sum of its values times its length.
pub fn path_score<I>(values: I) -> Score
where
    I: IntoIterator<Item = TileValue>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0 as Score, 0 as Score), |(sum, count), value| {
            (sum.saturating_add(value.into()), count + 1)
        });
    sum.saturating_mul(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_score_multiplies_sum_by_length() {
        assert_eq!(path_score([3, 3, 4, 4, 5, 5]), 144);
        assert_eq!(path_score([7]), 7);
        assert_eq!(path_score(core::iter::empty()), 0);
    }

    #[test]
    fn move_kind_classifies_steps() {
        let a = Position::new(2, 3);
        assert_eq!(
            MoveKind::between(a, Position::new(2, 0)),
            Some(MoveKind::Horizontal)
        );
        assert_eq!(
            MoveKind::between(a, Position::new(6, 3)),
            Some(MoveKind::Vertical)
        );
        assert_eq!(MoveKind::between(a, Position::new(1, 1)), None);
        assert_eq!(MoveKind::between(a, a), None);
        assert_eq!(MoveKind::Vertical.flipped(), MoveKind::Horizontal);
    }
}
