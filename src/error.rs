use thiserror::Error;

/// Faults that indicate a broken session setup rather than a gameplay outcome.
///
/// Rejected moves and rotations are not errors, and neither is game over.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("piece provider produced no tetromino")]
    NoPieceAvailable,

    #[error("grid {width}x{height} is too small, both sides must be at least {min}")]
    GridTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },
}
