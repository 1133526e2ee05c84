use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// A fully populated grid of tile values with the winning path embedded in it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardParts")]
pub struct Board {
    values: Array2<TileValue>,
    winning_path: Vec<Tile>,
}

/// Serialized form of a [`Board`], checked before it becomes one.
#[derive(Deserialize)]
struct BoardParts {
    values: Array2<TileValue>,
    winning_path: Vec<Tile>,
}

impl TryFrom<BoardParts> for Board {
    type Error = GameError;

    fn try_from(parts: BoardParts) -> Result<Self> {
        let positions: Vec<_> = parts.winning_path.iter().map(|tile| tile.pos).collect();
        let board = Self::from_parts(parts.values, &positions)?;
        if board.winning_path != parts.winning_path {
            return Err(GameError::InvalidBoardShape);
        }
        Ok(board)
    }
}

impl Board {
    /// Builds a board from a `(height, width)` value grid and the positions of its winning path,
    /// in order. The path tiles take their values from the grid.
    pub fn from_parts(values: Array2<TileValue>, winning_path: &[Position]) -> Result<Self> {
        let (height, width) = values.dim();
        if height == 0 || width == 0 || height > Coord::MAX.into() || width > Coord::MAX.into() {
            return Err(GameError::InvalidBoardShape);
        }

        let mut board = Self {
            values,
            winning_path: Vec::with_capacity(winning_path.len()),
        };
        for &pos in winning_path {
            let pos = board.validate_coords(pos)?;
            board.winning_path.push(Tile::new(pos, board[pos]));
        }
        Ok(board)
    }

    pub fn height(&self) -> Coord {
        self.values.dim().0.try_into().unwrap_or(Coord::MAX)
    }

    pub fn width(&self) -> Coord {
        self.values.dim().1.try_into().unwrap_or(Coord::MAX)
    }

    pub fn bottom_row(&self) -> Coord {
        self.height().saturating_sub(1)
    }

    pub fn validate_coords(&self, pos: Position) -> Result<Position> {
        if pos.row < self.height() && pos.col < self.width() {
            Ok(pos)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn tile_at(&self, pos: Position) -> Tile {
        Tile::new(pos, self[pos])
    }

    pub fn values(&self) -> &Array2<TileValue> {
        &self.values
    }

    pub fn winning_path(&self) -> &[Tile] {
        &self.winning_path
    }

    pub fn winning_sequence(&self) -> impl Iterator<Item = TileValue> + '_ {
        self.winning_path.iter().map(|tile| tile.value)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let (height, width) = (self.height(), self.width());
        (0..height).flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
    }
}

impl Index<Position> for Board {
    type Output = TileValue;

    fn index(&self, pos: Position) -> &Self::Output {
        &self.values[pos.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn from_parts_reads_path_values_from_grid() {
        let values = Array2::from_shape_vec((3, 3), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        let board = Board::from_parts(
            values,
            &[Position::new(0, 0), Position::new(0, 2), Position::new(2, 2)],
        )
        .unwrap();

        assert_eq!((board.height(), board.width()), (3, 3));
        assert_eq!(board.winning_sequence().collect::<Vec<_>>(), [1, 3, 9]);
        assert_eq!(board[Position::new(1, 2)], 6);
        assert_eq!(board.positions().count(), 9);
        assert_eq!(board.positions().nth(4), Some(Position::new(1, 1)));
    }

    #[test]
    fn from_parts_rejects_out_of_bounds_path() {
        let values = Array2::from_elem((2, 2), 1);
        assert_eq!(
            Board::from_parts(values, &[Position::new(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn from_parts_rejects_empty_grid() {
        let values = Array2::from_elem((0, 3), 1);
        assert_eq!(
            Board::from_parts(values, &[]),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn deserialize_checks_shape_and_path() {
        let values = Array2::from_shape_vec((2, 2), vec![1, 2, 3, 4]).unwrap();
        let board =
            Board::from_parts(values, &[Position::new(0, 1), Position::new(1, 1)]).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(serde_json::from_value::<Board>(json.clone()).unwrap(), board);

        let mut empty = json.clone();
        empty["values"] =
            serde_json::to_value(Array2::<TileValue>::from_elem((0, 2), 1)).unwrap();
        empty["winning_path"] = serde_json::Value::Array(Vec::new());
        assert!(serde_json::from_value::<Board>(empty).is_err());

        let mut tampered = json.clone();
        tampered["winning_path"][0]["value"] = serde_json::Value::from(9);
        assert!(serde_json::from_value::<Board>(tampered).is_err());

        let mut outside = json;
        outside["winning_path"][1]["pos"]["row"] = serde_json::Value::from(5);
        assert!(serde_json::from_value::<Board>(outside).is_err());
    }
}
