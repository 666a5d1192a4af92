//! Stage and pipe traits.
//!
//! A [`Stage`] transforms frames from a borrowed input FIFO into a borrowed
//! output FIFO and never holds on to either. A [`SamplePipe`] owns its input
//! and output FIFOs and is what the pull filter drives.

use tempus_core::FifoSampleBuffer;

/// One processing step between two FIFOs.
pub trait Stage {
    /// Consume what the stage can from `input` and append results to `output`.
    fn process(&mut self, input: &mut FifoSampleBuffer, output: &mut FifoSampleBuffer);

    /// Drop carried state (interpolation phase, overlap tail).
    fn clear(&mut self);

    /// Input frames that must be buffered before `process` makes progress.
    fn input_chunk_size(&self) -> usize {
        1
    }
}

/// A processor that owns its input and output FIFOs.
pub trait SamplePipe {
    fn input_buffer(&mut self) -> &mut FifoSampleBuffer;

    fn output_buffer(&mut self) -> &mut FifoSampleBuffer;

    fn output_frames(&self) -> usize;

    fn process(&mut self);

    /// Empty every owned FIFO and reset stage state.
    fn clear(&mut self);

    /// Input frames that must be buffered before `process` makes progress.
    fn input_chunk_size(&self) -> usize;
}

impl<P: SamplePipe + ?Sized> SamplePipe for &mut P {
    fn input_buffer(&mut self) -> &mut FifoSampleBuffer {
        (**self).input_buffer()
    }

    fn output_buffer(&mut self) -> &mut FifoSampleBuffer {
        (**self).output_buffer()
    }

    fn output_frames(&self) -> usize {
        (**self).output_frames()
    }

    fn process(&mut self) {
        (**self).process()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn input_chunk_size(&self) -> usize {
        (**self).input_chunk_size()
    }
}

/// Wraps a single [`Stage`] with its own input and output FIFOs.
#[derive(Debug, Clone, Default)]
pub struct StagePipe<S> {
    stage: S,
    input: FifoSampleBuffer,
    output: FifoSampleBuffer,
}

impl<S: Stage> StagePipe<S> {
    pub fn new(stage: S) -> Self {
        Self {
            stage,
            input: FifoSampleBuffer::new(),
            output: FifoSampleBuffer::new(),
        }
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn into_inner(self) -> S {
        self.stage
    }
}

impl<S: Stage> SamplePipe for StagePipe<S> {
    fn input_buffer(&mut self) -> &mut FifoSampleBuffer {
        &mut self.input
    }

    fn output_buffer(&mut self) -> &mut FifoSampleBuffer {
        &mut self.output
    }

    fn output_frames(&self) -> usize {
        self.output.frame_count()
    }

    fn process(&mut self) {
        self.stage.process(&mut self.input, &mut self.output);
    }

    fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
        self.stage.clear();
    }

    fn input_chunk_size(&self) -> usize {
        self.stage.input_chunk_size()
    }
}
