use core::fmt;
use thiserror::Error;

/// Which half of board generation ran out of attempts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenerationStage {
    Sequence,
    PathLayout,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => f.write_str("winning sequence"),
            Self::PathLayout => f.write_str("winning path layout"),
        }
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid round parameters: {0}")]
    InvalidParameters(&'static str),
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Unable to generate a {stage} after {attempts} attempts")]
    GenerationExhausted {
        stage: GenerationStage,
        attempts: u32,
    },
    #[error("Round is not active, no new moves are accepted")]
    NotActive,
    #[error("Action is not available right now")]
    InvalidAction,
}

impl GameError {
    pub const fn is_generation_failure(self) -> bool {
        matches!(self, Self::GenerationExhausted { .. })
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
