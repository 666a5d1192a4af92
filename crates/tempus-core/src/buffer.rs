//! Planar audio buffer descriptor handed to and from the host.

use crate::{Error, Result};

/// A fully buffered clip: sample rate plus one or more equally long channels.
///
/// Samples are nominally in `[-1.0, 1.0]` but are never clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// Fails when the sample rate is zero, no channel is given, or the
    /// channels differ in length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        let Some(first) = channels.first() else {
            return Err(Error::InvalidChannelCount(0));
        };
        let expected = first.len();
        if let Some((channel, data)) = channels
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != expected)
        {
            return Err(Error::ChannelLengthMismatch {
                channel,
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Single-channel buffer.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::new(sample_rate, vec![samples])
    }

    /// Zero-filled buffer with `num_channels` channels of `frames` frames.
    pub fn silent(num_channels: usize, sample_rate: u32, frames: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(Error::InvalidChannelCount(0));
        }
        Self::new(sample_rate, vec![vec![0.0; frames]; num_channels])
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        self.sample_rate = sample_rate;
        Ok(())
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frame count (samples per channel).
    #[inline]
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Result<&[f32]> {
        let count = self.channels.len();
        self.channels
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::ChannelOutOfRange { index, count })
    }

    pub fn channel_mut(&mut self, index: usize) -> Result<&mut [f32]> {
        let count = self.channels.len();
        self.channels
            .get_mut(index)
            .map(Vec::as_mut_slice)
            .ok_or(Error::ChannelOutOfRange { index, count })
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Reshape in place to `num_channels` x `frames`, zeroing every sample.
    ///
    /// Existing allocations are reused, so a scratch buffer that only ever
    /// grows settles at its high-water mark.
    pub fn reset(&mut self, num_channels: usize, frames: usize) -> Result<()> {
        if num_channels == 0 {
            return Err(Error::InvalidChannelCount(0));
        }
        self.channels.resize_with(num_channels, Vec::new);
        for data in &mut self.channels {
            data.clear();
            data.resize(frames, 0.0);
        }
        Ok(())
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}
