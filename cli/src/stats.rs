use anyhow::Result;
use breach_core::*;
use web_time::{Duration, Instant};

#[derive(Debug, Default, PartialEq)]
struct TierStats {
    generated: u32,
    sequence_failures: u32,
    path_failures: u32,
    other_failures: u32,
    elapsed: Duration,
}

impl TierStats {
    fn record(&mut self, result: &Result<Board, GameError>, elapsed: Duration) {
        self.elapsed += elapsed;
        match result {
            Ok(_) => self.generated += 1,
            Err(GameError::GenerationExhausted {
                stage: GenerationStage::Sequence,
                ..
            }) => self.sequence_failures += 1,
            Err(GameError::GenerationExhausted {
                stage: GenerationStage::PathLayout,
                ..
            }) => self.path_failures += 1,
            Err(err) => {
                log::warn!("Board generation failed outside the search: {}", err);
                self.other_failures += 1;
            }
        }
    }

    fn attempts(&self) -> u32 {
        self.generated + self.sequence_failures + self.path_failures + self.other_failures
    }

    fn success_rate(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            attempts => f64::from(self.generated) / f64::from(attempts),
        }
    }
}

/// Walks the difficulty progression as if every round were won and samples boards at each step.
pub fn run(progression: &Progression, boards: u32, rounds: u32, seed: u64) -> Result<()> {
    let mut params = progression.reset_difficulty();
    params.validate()?;

    println!("round  grid  time  required  success  seq-fail  path-fail  other  avg");
    for round_number in 1..=rounds {
        let mut stats = TierStats::default();
        for board in 0..boards {
            let board_seed = seed ^ (u64::from(round_number) << 32) ^ u64::from(board);
            let start = Instant::now();
            let result =
                RandomBoardGenerator::new(board_seed).generate(params.min_round_score, &params);
            stats.record(&result, start.elapsed());
        }

        let average = stats.elapsed / stats.attempts().max(1);
        println!(
            "{:>5}  {:>2}x{:<2} {:>4}s  {:>8}  {:>6.1}%  {:>8}  {:>9}  {:>5}  {:?}",
            round_number,
            params.grid_width,
            params.grid_height,
            params.round_time,
            params.min_round_score,
            stats.success_rate() * 100.0,
            stats.sequence_failures,
            stats.path_failures,
            stats.other_failures,
            average
        );
        log::debug!("round {}: {:?}", round_number, stats);

        params = progression.update_difficulty(round_number + 1, &params);
    }

    Ok(())
}
