//! Builder for configuring and constructing a `Stretcher`.

use tempus_stretch::{SearchMode, StretchConfig, Stretcher};

use crate::Result;

/// Every setting defaults to [`StretchConfig::default`]; window durations of
/// zero are derived from the tempo of each call.
///
/// # Example
///
/// ```ignore
/// use tempus::prelude::*;
///
/// let mut stretcher = StretcherBuilder::new()
///     .overlap_ms(10.0)
///     .quick_seek(false)
///     .build()?;
///
/// let half_speed = stretcher.process(&clip, 0.5)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct StretcherBuilder {
    config: StretchConfig,
}

impl StretcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: StretchConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 0 (auto)
    pub fn sequence_ms(mut self, ms: f64) -> Self {
        self.config.settings.sequence_ms = ms;
        self
    }

    /// Default: 0 (auto)
    pub fn seek_window_ms(mut self, ms: f64) -> Self {
        self.config.settings.seek_window_ms = ms;
        self
    }

    /// Default: 8
    pub fn overlap_ms(mut self, ms: f64) -> Self {
        self.config.settings.overlap_ms = ms;
        self
    }

    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.config.settings.search_mode = mode;
        self
    }

    /// Default: true
    pub fn quick_seek(mut self, quick: bool) -> Self {
        self.config.settings = self.config.settings.quick_seek(quick);
        self
    }

    /// Default: 4096
    pub fn chunk_frames(mut self, frames: usize) -> Self {
        self.config.chunk_frames = frames;
        self
    }

    /// Default: 65536
    pub fn headroom_frames(mut self, frames: usize) -> Self {
        self.config.headroom_frames = frames;
        self
    }

    /// Default: 1.0
    pub fn rate(mut self, rate: f64) -> Self {
        self.config.rate = rate;
        self
    }

    /// Default: 0.0
    pub fn pitch_semitones(mut self, semitones: f64) -> Self {
        self.config.pitch_semitones = semitones;
        self
    }

    pub fn build(self) -> Result<Stretcher> {
        tracing::debug!(config = ?self.config, "building stretcher");
        Ok(Stretcher::new(self.config)?)
    }
}
