use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use web_time::{SystemTime, UNIX_EPOCH};

mod play;
mod settings;
mod stats;
mod store;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// TOML file with round parameters and progression overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play in the terminal
    Play {
        /// Where the high score is kept
        #[arg(long, default_value = "breach-highscore.json")]
        high_score_file: PathBuf,
    },
    /// Generate many boards and report success rates and timings per round
    Stats {
        /// Boards generated for each round of the progression
        #[arg(short, long, default_value_t = 200)]
        boards: u32,

        /// How many won rounds of progression to walk through
        #[arg(short, long, default_value_t = 12)]
        rounds: u32,
    },
}

/// Seed from the wall clock when none was forced.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(clock_seed);
    log::debug!("seed: {}", seed);
    let progression = settings::load_progression(args.config.as_deref())?;

    match args.command {
        Command::Play { high_score_file } => {
            play::run(progression, store::FileHighScore::new(high_score_file), seed)
        }
        Command::Stats { boards, rounds } => stats::run(&progression, boards, rounds, seed),
    }
}
