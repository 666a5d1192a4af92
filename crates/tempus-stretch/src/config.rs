//! Stretch configuration.

use serde::{Deserialize, Serialize};

use crate::stretch::{SearchMode, TimeStretch, DEFAULT_OVERLAP_MS};
use crate::{Error, Result};

/// Frames pulled through the filter per driver iteration.
pub const DEFAULT_CHUNK_FRAMES: usize = 4096;

/// Silent frames appended after the source so the last windows drain.
pub const DEFAULT_HEADROOM_FRAMES: usize = 65536;

/// Window durations for the stretch engine.
///
/// A `sequence_ms` or `seek_window_ms` of zero means "derive from tempo".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchSettings {
    pub sequence_ms: f64,
    pub seek_window_ms: f64,
    pub overlap_ms: f64,
    pub search_mode: SearchMode,
}

impl Default for StretchSettings {
    fn default() -> Self {
        Self {
            sequence_ms: 0.0,
            seek_window_ms: 0.0,
            overlap_ms: DEFAULT_OVERLAP_MS,
            search_mode: SearchMode::Quick,
        }
    }
}

impl StretchSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence_ms(mut self, ms: f64) -> Self {
        self.sequence_ms = ms;
        self
    }

    pub fn seek_window_ms(mut self, ms: f64) -> Self {
        self.seek_window_ms = ms;
        self
    }

    pub fn overlap_ms(mut self, ms: f64) -> Self {
        self.overlap_ms = ms;
        self
    }

    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    pub fn quick_seek(self, quick: bool) -> Self {
        self.search_mode(if quick {
            SearchMode::Quick
        } else {
            SearchMode::Exhaustive
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.overlap_ms.is_finite() || self.overlap_ms <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "overlap_ms {} must be finite and positive",
                self.overlap_ms
            )));
        }
        for (name, value) in [
            ("sequence_ms", self.sequence_ms),
            ("seek_window_ms", self.seek_window_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} {value} must be finite and non-negative (0 = auto)"
                )));
            }
        }
        if self.sequence_ms > 0.0 && self.sequence_ms < 2.0 * self.overlap_ms {
            return Err(Error::InvalidConfig(format!(
                "sequence_ms {} shorter than two overlaps ({} ms)",
                self.sequence_ms,
                2.0 * self.overlap_ms
            )));
        }
        Ok(())
    }

    /// Push these settings into `stretch` for `sample_rate`.
    pub fn apply(&self, stretch: &mut TimeStretch, sample_rate: u32) {
        stretch.set_parameters(
            sample_rate,
            self.sequence_ms,
            self.seek_window_ms,
            self.overlap_ms,
        );
        stretch.set_search_mode(self.search_mode);
    }
}

/// Everything a [`Stretcher`](crate::Stretcher) needs besides the tempo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchConfig {
    pub settings: StretchSettings,
    pub chunk_frames: usize,
    pub headroom_frames: usize,
    /// Playback rate applied alongside the tempo (1.0 = none).
    pub rate: f64,
    /// Pitch shift in semitones (0.0 = none).
    pub pitch_semitones: f64,
}

impl Default for StretchConfig {
    fn default() -> Self {
        Self {
            settings: StretchSettings::default(),
            chunk_frames: DEFAULT_CHUNK_FRAMES,
            headroom_frames: DEFAULT_HEADROOM_FRAMES,
            rate: 1.0,
            pitch_semitones: 0.0,
        }
    }
}

impl StretchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: StretchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn chunk_frames(mut self, frames: usize) -> Self {
        self.chunk_frames = frames;
        self
    }

    pub fn headroom_frames(mut self, frames: usize) -> Self {
        self.headroom_frames = frames;
        self
    }

    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn pitch_semitones(mut self, semitones: f64) -> Self {
        self.pitch_semitones = semitones;
        self
    }

    /// Pitch as a frequency ratio.
    pub fn pitch(&self) -> f64 {
        2f64.powf(self.pitch_semitones / 12.0)
    }

    /// True when neither rate nor pitch changes the signal.
    pub fn is_neutral(&self) -> bool {
        self.rate == 1.0 && self.pitch_semitones == 0.0
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        if self.chunk_frames == 0 {
            return Err(Error::InvalidConfig("chunk_frames must be non-zero".into()));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(Error::InvalidRate(self.rate));
        }
        if !self.pitch_semitones.is_finite() {
            return Err(Error::InvalidPitch(self.pitch()));
        }
        Ok(())
    }
}
