use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must be at least 1x1")]
    InvalidSize,
    #[error("Too many mines, at least one cell must stay safe")]
    TooManyMines,
    #[error("Mine layout does not match the game configuration")]
    LayoutMismatch,
    #[error("Unknown difficulty preset")]
    UnknownDifficulty,
}

pub type Result<T> = core::result::Result<T, GameError>;
