use serde::{Deserialize, Serialize};

use crate::*;

/// Generation and timing knobs for a single round.
///
/// Missing keys fall back to the defaults when deserializing, so partial config files are fine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundParameters {
    pub grid_width: Coord,
    pub grid_height: Coord,
    pub min_tile_value: TileValue,
    pub max_tile_value: TileValue,
    /// Seconds per round.
    pub round_time: u32,
    pub min_round_score: Score,
    pub required_points_increment: Score,
    pub min_path_length: u8,
    pub max_path_length: u8,
    pub max_sequence_attempts: u32,
    pub max_path_attempts: u32,
}

impl RoundParameters {
    pub const INITIAL: Self = Self {
        grid_width: 7,
        grid_height: 7,
        min_tile_value: 1,
        max_tile_value: 9,
        round_time: 45,
        min_round_score: 100,
        required_points_increment: 100,
        min_path_length: 6,
        max_path_length: 12,
        max_sequence_attempts: 1000,
        max_path_attempts: 1000,
    };

    pub fn validate(&self) -> Result<()> {
        if self.grid_width < 2 || self.grid_height < 2 {
            return Err(GameError::InvalidParameters("grid must be at least 2x2"));
        }
        if self.min_tile_value == 0 || self.min_tile_value > self.max_tile_value {
            return Err(GameError::InvalidParameters(
                "tile values must satisfy 1 <= min <= max",
            ));
        }
        if self.min_path_length < 2 || self.min_path_length > self.max_path_length {
            return Err(GameError::InvalidParameters(
                "path lengths must satisfy 2 <= min <= max",
            ));
        }
        if self.round_time == 0 {
            return Err(GameError::InvalidParameters("round time must be positive"));
        }
        if self.max_sequence_attempts == 0 || self.max_path_attempts == 0 {
            return Err(GameError::InvalidParameters(
                "attempt budgets must be positive",
            ));
        }
        Ok(())
    }

    pub const fn bottom_row(&self) -> Coord {
        self.grid_height.saturating_sub(1)
    }
}

impl Default for RoundParameters {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Which grid dimension grows on every other period boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthAxis {
    #[default]
    Height,
    Width,
    /// Height first, then width, and so on.
    Alternate,
}

/// How the round parameters evolve after each won round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    pub initial: RoundParameters,
    pub max_min_round_score: Score,
    /// Rounds between two time bonuses.
    pub period: u32,
    /// Seconds added at each period boundary.
    pub time_bonus: u32,
    /// Period boundaries after which time and grid stop growing.
    pub max_boundaries: u32,
    pub growth_axis: GrowthAxis,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(RoundParameters::INITIAL)
    }
}

impl Progression {
    pub const fn new(initial: RoundParameters) -> Self {
        Self {
            initial,
            // above 9 * 12^2 = 1296 with the default tiles, so late rounds fail to generate
            max_min_round_score: 1337,
            period: 4,
            time_bonus: 5,
            max_boundaries: 4,
            growth_axis: GrowthAxis::Height,
        }
    }

    /// Parameters for `round_number`, which is the number of the round about to be played after
    /// a win.
    pub fn update_difficulty(&self, round_number: u32, params: &RoundParameters) -> RoundParameters {
        let mut next = params.clone();
        next.min_round_score = params
            .min_round_score
            .saturating_add(params.required_points_increment)
            .min(self.max_min_round_score);

        if let Some(boundary) = self.boundary_index(round_number) {
            next.round_time = next.round_time.saturating_add(self.time_bonus);
            if boundary % 2 == 0 {
                let grow_height = match self.growth_axis {
                    GrowthAxis::Height => true,
                    GrowthAxis::Width => false,
                    GrowthAxis::Alternate => boundary % 4 == 2,
                };
                if grow_height {
                    next.grid_height = next.grid_height.saturating_add(1);
                } else {
                    next.grid_width = next.grid_width.saturating_add(1);
                }
            }
            log::debug!(
                "Difficulty boundary {} reached at round {}: {}s, {}x{}",
                boundary,
                round_number,
                next.round_time,
                next.grid_width,
                next.grid_height
            );
        }

        next
    }

    pub fn reset_difficulty(&self) -> RoundParameters {
        self.initial.clone()
    }

    /// `k` when `round_number == k * period + 1` for `1 <= k <= max_boundaries`.
    fn boundary_index(&self, round_number: u32) -> Option<u32> {
        if self.period == 0 || round_number <= 1 {
            return None;
        }
        let played = round_number - 1;
        if played % self.period != 0 {
            return None;
        }
        let boundary = played / self.period;
        (boundary <= self.max_boundaries).then_some(boundary)
    }
}
