//! Error types for tempus-core.

use thiserror::Error;

/// Error type for tempus-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid sample rate: {0}. Must be greater than zero")]
    InvalidSampleRate(u32),

    #[error("Invalid channel count: {0}. At least one channel is required")]
    InvalidChannelCount(usize),

    #[error("Channel {channel} has {found} frames, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        found: usize,
    },

    #[error("Channel index {index} out of range ({count} channels)")]
    ChannelOutOfRange { index: usize, count: usize },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
