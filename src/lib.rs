//! # Tempus - Offline Time-Stretching
//!
//! Changes the tempo of fully buffered audio without changing its pitch,
//! using waveform-similarity overlap-add (WSOLA).
//!
//! ## Architecture
//!
//! Tempus is an umbrella crate over:
//! - **tempus-core** - Sample containers (`AudioBuffer`, interleaved FIFO)
//! - **tempus-stretch** - Stretch engine, rate transposer, pipeline, pull
//!   filter and whole-buffer driver
//!
//! ## Quick Start
//!
//! ```ignore
//! use tempus::prelude::*;
//!
//! let clip = AudioBuffer::new(44100, vec![left, right])?;
//!
//! // One-off, default settings
//! let faster = tempus::time_stretch(clip.clone(), 1.25)?;
//!
//! // Reusable, configured
//! let mut stretcher = StretcherBuilder::new().quick_seek(false).build()?;
//! let slower = stretcher.process(&clip, 0.8)?;
//! ```

/// Re-export of tempus-core for direct access
pub use tempus_core as core;

/// Re-export of tempus-stretch for direct access
pub use tempus_stretch as stretch;

pub use tempus_core::{AudioBuffer, FifoSampleBuffer, CHANNELS};

pub use tempus_stretch::{
    BufferSource, Pipeline, RateTransposer, SamplePipe, SampleSource, SearchMode, SimpleFilter,
    Stage, StagePipe, StretchConfig, StretchSettings, Stretcher, TimeStretch, Topology,
};

mod builder;
mod error;

pub use builder::StretcherBuilder;
pub use error::{Error, Result};

/// Stretch `buffer` by `tempo` with default settings.
///
/// Output length is `floor(len / tempo)`. Unity tempo hands `buffer` back
/// unchanged.
pub fn time_stretch(buffer: AudioBuffer, tempo: f64) -> Result<AudioBuffer> {
    Ok(tempus_stretch::time_stretch(buffer, tempo)?)
}

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{time_stretch, StretcherBuilder};

    pub use crate::core::AudioBuffer;

    pub use crate::stretch::{Pipeline, SearchMode, StretchConfig, StretchSettings, Stretcher};
}
