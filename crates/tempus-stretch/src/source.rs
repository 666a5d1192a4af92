//! Sample sources for the pull filter.

use tempus_core::{AudioBuffer, CHANNELS};

/// Random-access provider of interleaved stereo frames.
pub trait SampleSource {
    /// Write up to `frames` frames starting at source frame `position` into
    /// `dest`. Returns the frames written, zero once the source is exhausted.
    fn extract(&mut self, dest: &mut [f32], frames: usize, position: usize) -> usize;
}

/// Reads a planar [`AudioBuffer`] as interleaved stereo.
///
/// Channel 0 feeds the left side. The right side comes from channel 1, or
/// from channel 0 again for mono buffers. Further channels are ignored.
#[derive(Debug, Clone, Copy)]
pub struct BufferSource<'a> {
    buffer: &'a AudioBuffer,
    position: usize,
}

impl<'a> BufferSource<'a> {
    pub fn new(buffer: &'a AudioBuffer) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Frame position of the last read.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_dual_channel(&self) -> bool {
        self.buffer.num_channels() > 1
    }
}

impl SampleSource for BufferSource<'_> {
    fn extract(&mut self, dest: &mut [f32], frames: usize, position: usize) -> usize {
        self.position = position;
        let mut channels = self.buffer.channels();
        let Some(left) = channels.next() else {
            return 0;
        };
        let right = channels.next().unwrap_or(left);

        let frames = frames
            .min(left.len().saturating_sub(position))
            .min(dest.len() / CHANNELS);
        if frames == 0 {
            return 0;
        }
        let range = position..position + frames;
        for ((frame, &l), &r) in dest
            .chunks_exact_mut(CHANNELS)
            .zip(&left[range.clone()])
            .zip(&right[range])
        {
            frame[0] = l;
            frame[1] = r;
        }
        frames
    }
}
