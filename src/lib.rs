pub mod config;
pub mod error;
pub mod factory;
pub mod game;
pub mod grid;
pub mod tetromino;

pub use error::EngineError;
pub use factory::{PieceProvider, RandomPieceProvider, SequencePieceProvider, TetrominoFactory};
pub use game::{Game, GameEvent, GameStatus, Intent, Snapshot, TickOutcome};
pub use grid::Grid;
pub use tetromino::{Position, Shape, Tetromino, TetrominoKind};
