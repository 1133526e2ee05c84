use alloc::vec::Vec;
use core::ops::RangeInclusive;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Non-decreasing tile values that the winning path will carry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningSequence {
    values: Vec<TileValue>,
}

impl WinningSequence {
    /// Sorts `values` so the sequence is always non-decreasing.
    pub fn new(mut values: Vec<TileValue>) -> Self {
        values.sort_unstable();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[TileValue] {
        &self.values
    }

    pub fn score(&self) -> Score {
        path_score(self.values.iter().copied())
    }
}

/// Length at which an average sequence just reaches `required_score`.
///
/// A sequence of length `L` scores about `mean * L^2`, so this is the smallest `L` with
/// `mean * L^2 >= required_score`, computed without floating point.
pub fn desired_length(required_score: Score, params: &RoundParameters) -> u32 {
    // mean = (min + max) / 2, so compare (min + max) * L^2 against 2 * required
    let span = u64::from(params.min_tile_value) + u64::from(params.max_tile_value);
    let target = 2 * u64::from(required_score);
    if span == 0 {
        return u32::MAX;
    }
    let mut length = (target / span).isqrt();
    while span * length * length < target {
        length += 1;
    }
    length.try_into().unwrap_or(u32::MAX)
}

/// Candidate lengths: one either side of [`desired_length`], clamped to the path length bounds.
pub fn length_window(required_score: Score, params: &RoundParameters) -> RangeInclusive<u8> {
    let desired = desired_length(required_score, params);
    let min_len = u32::from(params.min_path_length);
    let max_len = u32::from(params.max_path_length);

    let lo = desired.saturating_sub(1).clamp(min_len, max_len);
    let hi = desired.saturating_add(1).clamp(lo, max_len);
    // both are within the u8 path length bounds after clamping
    (lo as u8)..=(hi as u8)
}

/// Whether the best possible sequence in the window could reach `required_score`.
pub fn is_score_reachable(required_score: Score, params: &RoundParameters) -> bool {
    let longest = *length_window(required_score, params).end();
    let best = path_score(core::iter::repeat_n(params.max_tile_value, longest.into()));
    best >= required_score
}

/// Rejection-samples a sorted sequence whose `sum * length` reaches `required_score`.
pub fn generate_winning_sequence<R>(
    rng: &mut R,
    required_score: Score,
    params: &RoundParameters,
) -> Result<WinningSequence>
where
    R: Rng + ?Sized,
{
    params.validate()?;
    if !is_score_reachable(required_score, params) {
        log::warn!(
            "Required score {} is out of reach for tiles {}..={} and lengths {:?}",
            required_score,
            params.min_tile_value,
            params.max_tile_value,
            length_window(required_score, params)
        );
        return Err(GameError::GenerationExhausted {
            stage: GenerationStage::Sequence,
            attempts: 0,
        });
    }

    let window = length_window(required_score, params);
    let values = params.min_tile_value..=params.max_tile_value;

    for attempt in 0..params.max_sequence_attempts {
        let length = rng.random_range(window.clone());
        let sequence = WinningSequence::new(
            (0..length)
                .map(|_| rng.random_range(values.clone()))
                .collect(),
        );
        if sequence.score() >= required_score {
            log::trace!(
                "Winning sequence {:?} scores {} after {} attempts",
                sequence.as_slice(),
                sequence.score(),
                attempt + 1
            );
            return Ok(sequence);
        }
    }

    log::warn!(
        "Unable to reach score {} within {} sequence attempts",
        required_score,
        params.max_sequence_attempts
    );
    Err(GameError::GenerationExhausted {
        stage: GenerationStage::Sequence,
        attempts: params.max_sequence_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    #[test]
    fn desired_length_follows_square_root_model() {
        let params = RoundParameters::default();
        // mean 5: 5 * 4^2 = 80 < 100 <= 5 * 5^2
        assert_eq!(desired_length(100, &params), 5);
        assert_eq!(desired_length(125, &params), 5);
        assert_eq!(desired_length(126, &params), 6);
        assert_eq!(desired_length(0, &params), 0);
    }

    #[test]
    fn window_is_clamped_to_path_bounds() {
        let params = RoundParameters::default();
        assert_eq!(length_window(100, &params), 6..=6);
        assert_eq!(length_window(500, &params), 9..=11);
        assert_eq!(length_window(1337, &params), 12..=12);
        assert_eq!(length_window(0, &params), 6..=6);
    }

    #[test]
    fn default_requirement_yields_valid_sequence() {
        let params = RoundParameters::default();
        let mut rng = SmallRng::seed_from_u64(7);

        let sequence = generate_winning_sequence(&mut rng, 100, &params).unwrap();

        assert_eq!(sequence.len(), 6);
        assert!(sequence.as_slice().is_sorted());
        assert!(sequence.score() >= 100);
        assert!(sequence.as_slice().iter().all(|v| (1..=9).contains(v)));
    }

    #[test]
    fn unreachable_requirement_fails_fast() {
        let params = RoundParameters::default();
        let mut rng = SmallRng::seed_from_u64(7);

        // 9 * 12 * 12 = 1296
        assert!(is_score_reachable(1296, &params));
        assert!(!is_score_reachable(1297, &params));
        assert_eq!(
            generate_winning_sequence(&mut rng, 5000, &params),
            Err(GameError::GenerationExhausted {
                stage: GenerationStage::Sequence,
                attempts: 0,
            })
        );
    }

    #[test]
    fn exhausting_attempts_reports_budget() {
        // only the all-max sequence reaches the score, which a single attempt rarely samples
        let params = RoundParameters {
            max_sequence_attempts: 1,
            min_path_length: 12,
            ..RoundParameters::default()
        };
        let mut failures = 0;
        for seed in 0..16 {
            let mut rng = SmallRng::seed_from_u64(seed);
            if let Err(err) = generate_winning_sequence(&mut rng, 1296, &params) {
                assert_eq!(
                    err,
                    GameError::GenerationExhausted {
                        stage: GenerationStage::Sequence,
                        attempts: 1,
                    }
                );
                failures += 1;
            }
        }
        assert!(failures > 0);
    }
}
