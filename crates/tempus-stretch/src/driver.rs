//! Buffer-to-buffer driver.
//!
//! Stretches a whole [`AudioBuffer`] in one call: the source is staged into
//! a zero-padded scratch buffer, pulled through a [`SimpleFilter`] over the
//! composed [`Pipeline`] in fixed chunks, and de-interleaved into a
//! destination of exactly `floor(len / (tempo * rate))` frames.

use tempus_core::{AudioBuffer, CHANNELS};

use crate::config::StretchConfig;
use crate::filter::{fill_block_frames, SimpleFilter};
use crate::pipe::SamplePipe;
use crate::pipeline::Pipeline;
use crate::source::BufferSource;
use crate::stretch::DEFAULT_SAMPLE_RATE;
use crate::{Error, Result};

/// Reusable offline stretcher.
///
/// Owns the pipeline and a scratch buffer that are recycled between calls;
/// every call starts from cleared state.
#[derive(Debug, Clone)]
pub struct Stretcher {
    config: StretchConfig,
    pipeline: Pipeline,
    scratch: AudioBuffer,
    chunk: Vec<f32>,
}

fn validate_tempo(tempo: f64) -> Result<()> {
    if tempo.is_finite() && tempo > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTempo(tempo))
    }
}

impl Stretcher {
    pub fn new(config: StretchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: Pipeline::with_sample_rate(DEFAULT_SAMPLE_RATE),
            scratch: AudioBuffer::silent(1, DEFAULT_SAMPLE_RATE, 0)?,
            chunk: vec![0.0; config.chunk_frames * CHANNELS],
            config,
        })
    }

    pub fn config(&self) -> &StretchConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// True when `tempo` with the configured rate and pitch leaves the
    /// signal untouched.
    pub fn is_bypass(&self, tempo: f64) -> bool {
        tempo == 1.0 && self.config.is_neutral()
    }

    /// Frames produced for a source of `frames` frames at `tempo`.
    pub fn output_len(&self, frames: usize, tempo: f64) -> usize {
        if self.is_bypass(tempo) {
            return frames;
        }
        (frames as f64 / (tempo * self.config.rate)).floor() as usize
    }

    /// Stretch `source` by `tempo` into a new buffer.
    ///
    /// The result keeps the sample rate and channel count of `source`.
    pub fn process(&mut self, source: &AudioBuffer, tempo: f64) -> Result<AudioBuffer> {
        validate_tempo(tempo)?;
        if self.is_bypass(tempo) {
            tracing::debug!(frames = source.len(), "unity tempo, bypassing pipeline");
            return Ok(source.clone());
        }
        self.run(source, tempo)
    }

    /// Like [`process`](Self::process), handing `source` back untouched on
    /// bypass instead of copying it.
    pub fn process_owned(&mut self, source: AudioBuffer, tempo: f64) -> Result<AudioBuffer> {
        validate_tempo(tempo)?;
        if self.is_bypass(tempo) {
            tracing::debug!(frames = source.len(), "unity tempo, bypassing pipeline");
            return Ok(source);
        }
        self.run(&source, tempo)
    }

    fn prepare_pipeline(&mut self, sample_rate: u32, tempo: f64) {
        self.pipeline
            .apply_settings(&self.config.settings, sample_rate);
        self.pipeline.set_rate(self.config.rate);
        self.pipeline.set_pitch_semitones(self.config.pitch_semitones);
        self.pipeline.set_tempo(tempo);
        self.pipeline.clear();
    }

    /// Zero the scratch buffer and copy the carried channels into it.
    fn stage_source(&mut self, source: &AudioBuffer, headroom: usize) -> Result<()> {
        let channels = source.num_channels().min(CHANNELS);
        self.scratch.reset(channels, source.len() + headroom)?;
        self.scratch.set_sample_rate(source.sample_rate())?;
        for (dst, src) in self.scratch.channels_mut().zip(source.channels()) {
            dst[..src.len()].copy_from_slice(src);
        }
        Ok(())
    }

    fn run(&mut self, source: &AudioBuffer, tempo: f64) -> Result<AudioBuffer> {
        let sample_rate = source.sample_rate();
        let out_frames = self.output_len(source.len(), tempo);
        tracing::debug!(
            frames = source.len(),
            channels = source.num_channels(),
            sample_rate,
            tempo,
            rate = self.config.rate,
            pitch_semitones = self.config.pitch_semitones,
            out_frames,
            "stretch started"
        );

        self.prepare_pipeline(sample_rate, tempo);
        let required = self.pipeline.input_chunk_size();
        let headroom = self
            .config
            .headroom_frames
            .max(2 * (fill_block_frames(required) + required));
        self.stage_source(source, headroom)?;

        let mut left = vec![0.0f32; out_frames];
        let mut right = vec![0.0f32; out_frames];
        let chunk_frames = self.config.chunk_frames;
        let mut filter = SimpleFilter::new(BufferSource::new(&self.scratch), &mut self.pipeline);
        let mut written = 0;
        while written < out_frames {
            let wanted = chunk_frames.min(out_frames - written);
            let read = filter.extract(&mut self.chunk, wanted);
            if read == 0 {
                break;
            }
            for (i, frame) in self.chunk[..read * CHANNELS]
                .chunks_exact(CHANNELS)
                .enumerate()
            {
                left[written + i] = frame[0];
                right[written + i] = frame[1];
            }
            written += read;
        }

        if written < out_frames {
            tracing::warn!(
                written,
                expected = out_frames,
                "source exhausted before destination was filled"
            );
        }

        let mut channels = Vec::with_capacity(source.num_channels());
        channels.push(left);
        if source.num_channels() > 1 {
            channels.push(right);
        }
        while channels.len() < source.num_channels() {
            channels.push(channels[0].clone());
        }

        tracing::debug!(written, "stretch finished");
        Ok(AudioBuffer::new(sample_rate, channels)?)
    }
}

/// Stretch `buffer` by `tempo` with default settings.
///
/// Unity tempo returns `buffer` itself.
pub fn time_stretch(buffer: AudioBuffer, tempo: f64) -> Result<AudioBuffer> {
    Stretcher::new(StretchConfig::default())?.process_owned(buffer, tempo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_buffer(frames: usize, channels: usize) -> AudioBuffer {
        let data: Vec<f32> = (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * 441.0 * i as f32 / 44100.0).sin() * 0.5)
            .collect();
        AudioBuffer::new(44100, vec![data; channels]).unwrap()
    }

    fn stretcher() -> Stretcher {
        Stretcher::new(StretchConfig::default()).unwrap()
    }

    #[test]
    fn test_bypass_returns_source() {
        let source = sine_buffer(1234, 2);
        let out = stretcher().process(&source, 1.0).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn test_output_lengths() {
        let mut stretcher = stretcher();
        let source = sine_buffer(44100, 1);
        for (tempo, expected) in [(2.0, 22050), (0.5, 88200), (1.25, 35280), (0.625, 70560)] {
            let out = stretcher.process(&source, tempo).unwrap();
            assert_eq!(out.len(), expected, "tempo {tempo}");
            assert_eq!(out.sample_rate(), 44100);
        }
    }

    #[test]
    fn test_short_input_lengths() {
        let mut stretcher = stretcher();
        let out = stretcher.process(&sine_buffer(1000, 1), 0.5).unwrap();
        assert_eq!(out.len(), 2000);
    }

    #[test]
    fn test_rejects_bad_tempo() {
        let mut stretcher = stretcher();
        let source = sine_buffer(100, 1);
        for tempo in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                stretcher.process(&source, tempo),
                Err(Error::InvalidTempo(_))
            ));
        }
    }

    #[test]
    fn test_channel_layout() {
        let mut stretcher = stretcher();
        let left = sine_buffer(20_000, 1).into_channels().remove(0);
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let source = AudioBuffer::new(44100, vec![left.clone(), right, left]).unwrap();

        let out = stretcher.process(&source, 1.5).unwrap();

        assert_eq!(out.num_channels(), 3);
        let l = out.channel(0).unwrap();
        let r = out.channel(1).unwrap();
        let extra = out.channel(2).unwrap();
        assert_eq!(l, extra);
        for (a, b) in l.iter().zip(r) {
            approx::assert_abs_diff_eq!(*a, -*b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rate_and_pitch_change_length() {
        let config = StretchConfig::new().rate(2.0);
        let mut stretcher = Stretcher::new(config).unwrap();
        let out = stretcher.process(&sine_buffer(44100, 1), 1.0).unwrap();
        assert_eq!(out.len(), 22050);

        // Pitch alone keeps the length.
        let config = StretchConfig::new().pitch_semitones(5.0);
        let mut stretcher = Stretcher::new(config).unwrap();
        assert!(!stretcher.is_bypass(1.0));
        let out = stretcher.process(&sine_buffer(44100, 1), 1.0).unwrap();
        assert_eq!(out.len(), 44100);
    }

    #[test]
    fn test_time_stretch_helper() {
        let source = sine_buffer(4410, 1);
        let same = time_stretch(source.clone(), 1.0).unwrap();
        assert_eq!(same, source);
        assert_eq!(time_stretch(source, 2.0).unwrap().len(), 2205);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Stretcher::new(StretchConfig::new().rate(-2.0)).is_err());
    }
}
