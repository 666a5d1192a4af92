//! Pull filter: drives a [`SamplePipe`] from a [`SampleSource`].
//!
//! The consumer asks for output frames; the filter tops the pipe's input up
//! from the source in fixed blocks and runs `process` until enough output is
//! buffered or the source runs dry. Delivered output is kept for a while so
//! the read position can be moved back.

use tempus_core::CHANNELS;

use crate::pipe::SamplePipe;
use crate::source::SampleSource;
use crate::{Error, Result};

/// Input frames buffered before each `process` call.
pub const FILL_BLOCK_FRAMES: usize = 16384;

/// Delivered output frames kept for rewinding.
pub const HISTORY_FRAMES: usize = 22050;

/// Block size the filter uses for a pipe needing `input_chunk_size` frames.
pub fn fill_block_frames(input_chunk_size: usize) -> usize {
    FILL_BLOCK_FRAMES.max(input_chunk_size)
}

#[derive(Debug)]
pub struct SimpleFilter<S, P> {
    source: S,
    pipe: P,
    history_frames: usize,
    /// Next source frame to read.
    source_position: usize,
    /// Read offset into the pipe's output, at most `history_frames`.
    output_position: usize,
    /// Output frames delivered so far.
    position: usize,
    read_buf: Vec<f32>,
}

impl<S: SampleSource, P: SamplePipe> SimpleFilter<S, P> {
    pub fn new(source: S, pipe: P) -> Self {
        Self {
            source,
            pipe,
            history_frames: HISTORY_FRAMES,
            source_position: 0,
            output_position: 0,
            position: 0,
            read_buf: Vec::new(),
        }
    }

    pub fn with_history(mut self, frames: usize) -> Self {
        self.history_frames = frames;
        self
    }

    pub fn pipe(&self) -> &P {
        &self.pipe
    }

    pub fn pipe_mut(&mut self) -> &mut P {
        &mut self.pipe
    }

    pub fn into_parts(self) -> (S, P) {
        (self.source, self.pipe)
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the read position back into the retained history.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.position {
            return Err(Error::PositionAhead {
                requested: position,
                current: self.position,
            });
        }
        let back = self.position - position;
        if back > self.output_position {
            return Err(Error::PositionOutsideHistory {
                requested: position,
                history: self.history_frames,
            });
        }
        self.output_position -= back;
        self.position = position;
        Ok(())
    }

    #[inline]
    pub fn source_position(&self) -> usize {
        self.source_position
    }

    /// Drop everything buffered and continue reading the source at
    /// `position`.
    pub fn set_source_position(&mut self, position: usize) {
        self.clear();
        self.source_position = position;
    }

    pub fn clear(&mut self) {
        self.pipe.clear();
        self.output_position = 0;
    }

    fn fill_input_buffer(&mut self, frames: usize) {
        if frames == 0 {
            return;
        }
        self.read_buf.resize(frames * CHANNELS, 0.0);
        let read = self
            .source
            .extract(&mut self.read_buf, frames, self.source_position);
        self.source_position += read;
        self.pipe
            .input_buffer()
            .put_samples(&self.read_buf, 0, Some(read));
    }

    fn fill_output_buffer(&mut self, frames: usize) {
        let block = fill_block_frames(self.pipe.input_chunk_size());
        while self.pipe.output_frames() < frames {
            let missing = block.saturating_sub(self.pipe.input_buffer().frame_count());
            self.fill_input_buffer(missing);
            if self.pipe.input_buffer().frame_count() < block {
                break;
            }
            self.pipe.process();
        }
    }

    /// Pull up to `frames` output frames into `dest`.
    ///
    /// Returns the frames written. Fewer than requested means the source is
    /// exhausted; the pipe only runs on full blocks, so the tail of a source
    /// stays buffered unless the source is padded.
    pub fn extract(&mut self, dest: &mut [f32], frames: usize) -> usize {
        let frames = frames.min(dest.len() / CHANNELS);
        self.fill_output_buffer(self.output_position + frames);

        let available = self
            .pipe
            .output_frames()
            .saturating_sub(self.output_position);
        let read = frames.min(available);
        let output = self.pipe.output_buffer();
        output.extract(dest, self.output_position, read);

        let end = self.output_position + read;
        self.output_position = end.min(self.history_frames);
        output.receive(Some(end.saturating_sub(self.history_frames)));
        self.position += read;
        read
    }
}
