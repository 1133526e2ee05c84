use std::fs;
use std::path::PathBuf;

use breach_core::{HighScoreStore, Score};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: Score,
}

/// High score kept in a small JSON file. Read or write failures are logged, never fatal.
#[derive(Debug, Clone)]
pub struct FileHighScore {
    path: PathBuf,
}

impl FileHighScore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HighScoreStore for FileHighScore {
    fn load(&self) -> Score {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) => {
                log::debug!("No high score at {}: {}", self.path.display(), err);
                return 0;
            }
        };
        match serde_json::from_str::<HighScoreFile>(&text) {
            Ok(file) => file.high_score,
            Err(err) => {
                log::warn!("Ignoring unreadable high score {}: {}", self.path.display(), err);
                0
            }
        }
    }

    fn save(&mut self, high_score: Score) {
        let result = serde_json::to_string(&HighScoreFile { high_score })
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(&self.path, json));
        if let Err(err) = result {
            log::error!("Could not save high score to {}: {}", self.path.display(), err);
        }
    }
}
