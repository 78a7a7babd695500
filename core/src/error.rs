use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Why a play log could not certify a win.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("Replay log is empty")]
    EmptyLog,
    #[error("Replay log could not be parsed: {0}")]
    Malformed(alloc::string::String),
    #[error("Action #{index} references a cell outside the board")]
    OutOfRange { index: usize },
    #[error("Action #{index} has a bad verification code")]
    VerificationMismatch { index: usize },
    #[error("Action #{index} digs a bomb")]
    HitMine { index: usize },
    #[error("Replay solved {solved} of {total} 3BV")]
    Shortfall { solved: CellCount, total: CellCount },
}
