//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Buffer construction or access failed.
    #[error(transparent)]
    Core(#[from] tempus_core::Error),

    /// Tempo must be finite and positive.
    #[error("Invalid tempo: {0}. Must be finite and greater than zero")]
    InvalidTempo(f64),

    /// Rate must be finite and positive.
    #[error("Invalid rate: {0}. Must be finite and greater than zero")]
    InvalidRate(f64),

    /// Pitch must be finite and positive.
    #[error("Invalid pitch: {0}. Must be finite and greater than zero")]
    InvalidPitch(f64),

    /// Configuration rejected by `validate()`.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Output position moved forward.
    #[error("New position {requested} may not be greater than current position {current}")]
    PositionAhead { requested: usize, current: usize },

    /// Output position rewound past the retained history.
    #[error("New position {requested} falls outside of the {history} frame history")]
    PositionOutsideHistory { requested: usize, history: usize },
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
