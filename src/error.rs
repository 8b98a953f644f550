use thiserror::Error;

/// Errors raised while reading a puzzle matrix or extracting its state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(&'static str),

    #[error("unknown tile symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },

    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("puzzle of {height}x{width} tiles exceeds the maximum of {max}x{max}")]
    TooLarge {
        height: usize,
        width: usize,
        max: usize,
    },
}
