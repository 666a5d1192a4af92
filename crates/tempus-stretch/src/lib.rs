//! WSOLA time-stretching for fully buffered audio.
//!
//! - [`TimeStretch`]: tempo stage (waveform-similarity overlap-add)
//! - [`RateTransposer`]: rate/pitch stage (linear interpolation)
//! - [`Pipeline`]: both stages composed behind rate, tempo and pitch knobs
//! - [`SimpleFilter`]: pulls a [`SamplePipe`] from a [`SampleSource`]
//! - [`Stretcher`]: whole-buffer driver on top of all of the above
//!
//! # Example
//!
//! ```ignore
//! use tempus_stretch::{StretchConfig, Stretcher};
//!
//! let mut stretcher = Stretcher::new(StretchConfig::default())?;
//! let slower = stretcher.process(&clip, 0.8)?;
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{StretchConfig, StretchSettings};

pub mod pipe;
pub use pipe::{SamplePipe, Stage, StagePipe};

pub mod transposer;
pub use transposer::RateTransposer;

pub mod stretch;
pub use stretch::{SearchMode, TimeStretch};

pub mod pipeline;
pub use pipeline::{Pipeline, Topology};

pub mod source;
pub use source::{BufferSource, SampleSource};

pub mod filter;
pub use filter::SimpleFilter;

mod driver;
pub use driver::{time_stretch, Stretcher};

pub use tempus_core::{AudioBuffer, FifoSampleBuffer, CHANNELS};
