//! Sample containers shared by the Tempus stretch stages.
//!
//! - [`AudioBuffer`]: planar clip descriptor exchanged with the host
//! - [`FifoSampleBuffer`]: growable interleaved FIFO every stage reads and writes

pub mod error;
pub use error::{Error, Result};

mod buffer;
pub use buffer::AudioBuffer;

pub mod fifo;
pub use fifo::{FifoSampleBuffer, CHANNELS};
