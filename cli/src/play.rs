use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use anyhow::Result;
use breach_core::*;
use web_time::{Duration, Instant};

const HELP: &str = "\
commands:
  <row> <col>   select a tile (0-based, row 0 is the top)
  start         start a round
  next          start the next round after a breach
  stop          abandon the current round
  reveal        show the winning path after getting caught
  restart       new game from round 1
  help          show this text
  quit          leave";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Select(Position),
    Start,
    Next,
    Stop,
    Reveal,
    Restart,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let words: Vec<_> = line.split_whitespace().collect();
    Some(match words.as_slice() {
        ["start"] => Command::Start,
        ["next"] => Command::Next,
        ["stop"] => Command::Stop,
        ["reveal"] => Command::Reveal,
        ["restart"] => Command::Restart,
        ["help" | "?"] => Command::Help,
        ["quit" | "exit" | "q"] => Command::Quit,
        [row, col] => Command::Select(Position::new(row.parse().ok()?, col.parse().ok()?)),
        _ => return None,
    })
}

/// Converts elapsed wall-clock time into whole-second ticks.
struct Clock {
    last: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn reset(&mut self) {
        self.last = Instant::now();
    }

    fn pending_ticks(&mut self) -> u64 {
        let elapsed = self.last.elapsed();
        let ticks = elapsed.as_secs();
        self.last += Duration::from_secs(ticks);
        ticks
    }
}

/// How long to wait for input before checking the countdown again.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run<S: HighScoreStore>(progression: Progression, store: S, seed: u64) -> Result<()> {
    let mut session = Session::new(progression, store, seed);
    let mut clock = Clock::new();
    let mut stdout = io::stdout();

    println!("{HELP}");
    println!("High score: {}", session.state().high_score);

    // stdin blocks, so lines are read on their own thread and the countdown keeps running
    let (lines_tx, lines) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        let line = match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => Some(line?),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let events = drain_ticks(&mut session, clock.pending_ticks());
        let Some(line) = line else {
            if needs_redraw(&events) {
                show(&session, &events);
                stdout.flush()?;
            }
            continue;
        };
        report(&events);

        let Some(command) = parse_command(&line) else {
            println!("Unknown command, try `help`");
            continue;
        };
        let events = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Select(pos) => session.select_tile(pos),
            Command::Stop => session.stop(),
            Command::Reveal => session.reveal_solution(),
            Command::Start | Command::Next | Command::Restart => {
                let started = match command {
                    Command::Next => session.next_round(),
                    Command::Restart => session.restart(),
                    _ => session.start_round(),
                };
                match started {
                    Ok(events) => {
                        clock.reset();
                        events
                    }
                    Err(err) if err.is_generation_failure() => {
                        println!("{err}. Please try again.");
                        continue;
                    }
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                }
            }
        };

        show(&session, &events);
        stdout.flush()?;
    }

    Ok(())
}

fn drain_ticks<S: HighScoreStore>(session: &mut Session<S>, ticks: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(session.tick());
    }
    events
}

fn round_ended(events: &[GameEvent]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, GameEvent::RoundEnded { .. }))
}

/// Time warnings and time-outs are shown without waiting for the next command.
fn needs_redraw(events: &[GameEvent]) -> bool {
    round_ended(events)
        || events.iter().any(|event| {
            matches!(
                event,
                GameEvent::TimeTick {
                    warning: Some(_),
                    ..
                }
            )
        })
}

fn show<S: HighScoreStore>(session: &Session<S>, events: &[GameEvent]) {
    report(events);
    if round_ended(events) {
        print!("{}", history_table(session.history()));
    }
    print!("{}", render(session));
}

fn report(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::RoundStarted {
                round_number,
                required_score,
                time_left,
            } => println!(
                "Round {round_number}: breach with {required_score} points in {time_left}s"
            ),
            GameEvent::MoveAccepted { new_score, .. } => println!("Score: {new_score}"),
            GameEvent::RoundEnded {
                outcome: RoundOutcome::Won,
                final_score,
            } => println!("Your breach was successful! ({final_score} points)"),
            GameEvent::RoundEnded {
                outcome: RoundOutcome::Lost(reason),
                final_score,
            } => println!("You have been caught! ({final_score} points, {reason:?})"),
            GameEvent::TimeTick {
                seconds_left,
                warning: Some(_),
            } => println!("{seconds_left}s left!"),
            GameEvent::TimeTick { .. } => {}
            GameEvent::SolutionRevealed { path } => {
                let steps: Vec<_> = path
                    .iter()
                    .map(|tile| format!("({},{})={}", tile.pos.row, tile.pos.col, tile.value))
                    .collect();
                println!("Solution: {}", steps.join(" -> "));
            }
            GameEvent::HighScoreUpdated { high_score } => println!("New high score: {high_score}"),
        }
    }
}

fn history_table(history: &[RoundRecord]) -> String {
    let mut out = String::from("round  required  achieved  total\n");
    for record in history {
        let _ = writeln!(
            out,
            "{:>5}  {:>8}  {:>8}  {:>5}{}",
            record.round_number,
            record.required_score,
            record.achieved,
            record.cumulative,
            if record.won { "" } else { "  caught" }
        );
    }
    out
}

/// Text board: `[n]` selected, `*n` legal, `#n` on the revealed solution.
fn render<S: HighScoreStore>(session: &Session<S>) -> String {
    let snapshot = Snapshot::from_session(session);
    let mut out = String::new();
    let Some(round) = snapshot.round else {
        return out;
    };

    let solution = round.solution.as_deref().unwrap_or_default();
    let (height, width) = round.values.dim();
    let _ = write!(out, "    ");
    for col in 0..width {
        let _ = write!(out, "{col:>4}");
    }
    out.push('\n');
    for row in 0..height {
        let _ = write!(out, "{row:>4}");
        for col in 0..width {
            // dimensions come from a Board, so both fit in a Coord
            let pos = Position::new(row as Coord, col as Coord);
            let value = round.values[[row, col]];
            let cell = if round.selected.iter().any(|tile| tile.pos == pos) {
                format!("[{value}]")
            } else if solution.iter().any(|tile| tile.pos == pos) {
                format!("#{value}")
            } else if round.legal_moves.contains(&pos) {
                format!("*{value}")
            } else {
                value.to_string()
            };
            let _ = write!(out, "{cell:>4}");
        }
        out.push('\n');
    }

    let status = if round.is_breached() {
        "Breached!".to_string()
    } else {
        format!("Missing: {}", round.points_missing)
    };
    let _ = writeln!(
        out,
        "Time: {:02}:{:02}  Score: {}  {}  Total: {}",
        round.time_left / 60,
        round.time_left % 60,
        round.round_score,
        status,
        snapshot.session.total_score
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!(
            parse_command("3 4"),
            Some(Command::Select(Position::new(3, 4)))
        );
        assert_eq!(parse_command("  next "), Some(Command::Next));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("3 x"), None);
        assert_eq!(parse_command("300 1"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn render_marks_legal_top_row() {
        let mut session = Session::new(Progression::default(), MemoryHighScore(0), 2);
        assert!(render(&session).is_empty());

        session.start_round().unwrap();
        let text = render(&session);

        let top_row = text.lines().nth(1).unwrap();
        assert_eq!(top_row.matches('*').count(), 7);
        assert!(text.contains("Time: 00:45"));
        assert!(text.contains("Missing: 100"));
    }

    #[test]
    fn render_shows_revealed_solution_after_time_up() {
        let mut session = Session::new(Progression::default(), MemoryHighScore(0), 5);
        session.start_round().unwrap();

        let events = drain_ticks(&mut session, 45);
        assert!(round_ended(&events));
        assert!(!render(&session).contains('#'));

        session.reveal_solution();
        let text = render(&session);

        let path_len = session.round().unwrap().board().winning_path().len();
        assert_eq!(text.matches('#').count(), path_len);
        assert!(!text.contains('*'));
        assert!(text.contains("Time: 00:00"));
    }

    #[test]
    fn countdown_redraws_only_on_warnings_and_time_up() {
        let mut session = Session::new(Progression::default(), MemoryHighScore(0), 8);
        session.start_round().unwrap();

        assert!(!needs_redraw(&drain_ticks(&mut session, 3)));
        // 45 - 3 - 32 = 10 seconds left
        assert!(needs_redraw(&drain_ticks(&mut session, 32)));
        assert!(!needs_redraw(&drain_ticks(&mut session, 1)));
        assert!(needs_redraw(&drain_ticks(&mut session, 9)));
        assert!(session.is_game_over());
        assert!(drain_ticks(&mut session, 5).is_empty());
    }
}
