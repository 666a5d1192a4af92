//! Linear-interpolation rate transposer.
//!
//! Changes playback rate, and with it pitch, by a fixed ratio. A virtual read
//! pointer advances by `rate` input frames per output frame; each output
//! frame interpolates the two input frames bracketing the pointer. The last
//! input frame of every call is carried so the next call continues
//! seamlessly across the chunk boundary.

use tempus_core::{FifoSampleBuffer, CHANNELS};

use crate::pipe::Stage;

#[derive(Debug, Clone)]
pub struct RateTransposer {
    /// Input frames consumed per output frame.
    rate: f64,
    /// Pointer position relative to the carried frame.
    slope_count: f64,
    prev_left: f32,
    prev_right: f32,
}

impl Default for RateTransposer {
    fn default() -> Self {
        Self::new()
    }
}

impl RateTransposer {
    pub fn new() -> Self {
        Self {
            rate: 1.0,
            slope_count: 0.0,
            prev_left: 0.0,
            prev_right: 0.0,
        }
    }

    pub fn with_rate(rate: f64) -> Self {
        let mut transposer = Self::new();
        transposer.set_rate(rate);
        transposer
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        debug_assert!(rate.is_finite() && rate > 0.0, "rate must be positive: {rate}");
        self.rate = rate;
    }

    /// Reset interpolation phase and the carried frame.
    pub fn reset(&mut self) {
        self.slope_count = 0.0;
        self.prev_left = 0.0;
        self.prev_right = 0.0;
    }

    /// Upper bound on frames produced from `input_frames` frames.
    pub fn max_output_frames(&self, input_frames: usize) -> usize {
        (input_frames as f64 / self.rate).ceil() as usize + 2
    }

    fn remember_last_frame(&mut self, src: &[f32]) {
        if let [.., left, right] = *src {
            self.prev_left = left;
            self.prev_right = right;
        }
    }

    /// Interpolate interleaved `src` into `dst`, returning frames written.
    ///
    /// `dst` must hold at least [`max_output_frames`](Self::max_output_frames)
    /// frames for `src`.
    fn transpose(&mut self, src: &[f32], dst: &mut [f32]) -> usize {
        let frames = src.len() / CHANNELS;
        if frames == 0 {
            return 0;
        }

        let mut out = 0;
        while self.slope_count < 1.0 {
            let s = self.slope_count as f32;
            dst[out * CHANNELS] = (1.0 - s) * self.prev_left + s * src[0];
            dst[out * CHANNELS + 1] = (1.0 - s) * self.prev_right + s * src[1];
            out += 1;
            self.slope_count += self.rate;
        }
        self.slope_count -= 1.0;

        if frames > 1 {
            let mut used = 0;
            'frames: loop {
                while self.slope_count > 1.0 {
                    self.slope_count -= 1.0;
                    used += 1;
                    if used >= frames - 1 {
                        break 'frames;
                    }
                }
                let h = used * CHANNELS;
                let s = self.slope_count as f32;
                dst[out * CHANNELS] = (1.0 - s) * src[h] + s * src[h + 2];
                dst[out * CHANNELS + 1] = (1.0 - s) * src[h + 1] + s * src[h + 3];
                out += 1;
                self.slope_count += self.rate;
            }
        }

        self.remember_last_frame(src);
        out
    }
}

impl Stage for RateTransposer {
    fn process(&mut self, input: &mut FifoSampleBuffer, output: &mut FifoSampleBuffer) {
        let frames = input.frame_count();
        if frames == 0 {
            return;
        }

        // Exact pass-through; interpolating at s == 1.0 would accumulate drift.
        if self.rate == 1.0 {
            output.put_buffer(input, 0, None);
            self.remember_last_frame(input.samples());
            self.slope_count = 1.0;
            input.receive(None);
            return;
        }

        let capacity = self.max_output_frames(frames);
        let written = self.transpose(input.samples(), output.tail_mut(capacity));
        input.receive(None);
        output.put(written);
    }

    fn clear(&mut self) {
        self.reset();
    }
}
