//! WSOLA tempo stage.
//!
//! Each cycle finds where the upcoming input best continues the previous
//! window's tail, cross-fades the two over `overlap_length` frames, copies
//! the rest of the window straight through and then skips
//! `tempo * (window - overlap)` input frames. Output advances by
//! `window - overlap` frames per cycle, so length scales by `1 / tempo`
//! while pitch is untouched.

mod params;
mod search;

pub use params::{
    auto_seek_window_ms, auto_sequence_ms, ms_to_frames, overlap_frames, AUTOSEEK_AT_MAX,
    AUTOSEEK_AT_MIN, AUTOSEEK_C, AUTOSEEK_K, AUTOSEQ_AT_MAX, AUTOSEQ_AT_MIN, AUTOSEQ_C,
    AUTOSEQ_K, AUTOSEQ_TEMPO_LOW, AUTOSEQ_TEMPO_TOP, DEFAULT_OVERLAP_MS, MIN_OVERLAP_FRAMES,
    OVERLAP_GRANULE,
};
pub use search::{
    cross_correlation, seek_best_overlap, seek_exhaustive, seek_quick, weighted_reference,
    SearchMode, SCAN_OFFSETS,
};

use tempus_core::{FifoSampleBuffer, CHANNELS};

use crate::pipe::Stage;

/// Sample rate assumed until [`TimeStretch::set_parameters`] says otherwise.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

#[derive(Debug, Clone)]
pub struct TimeStretch {
    sample_rate: u32,
    tempo: f64,
    search_mode: SearchMode,

    // Durations, either explicit or derived from tempo.
    sequence_ms: f64,
    seek_window_ms: f64,
    overlap_ms: f64,
    auto_sequence: bool,
    auto_seek_window: bool,

    // Derived lengths, in frames.
    overlap_length: usize,
    seek_window_length: usize,
    seek_length: usize,
    sample_req: usize,

    nominal_skip: f64,
    skip_fract: f64,

    /// Tail of the previous window, waiting to be cross-faded.
    mid_buffer: Vec<f32>,
    /// False until `mid_buffer` has been seeded from the input.
    primed: bool,
    ref_mid_buffer: Vec<f32>,
}

impl Default for TimeStretch {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl TimeStretch {
    /// Auto-sized windows at tempo 1.0.
    pub fn new(sample_rate: u32) -> Self {
        let mut stretch = Self {
            sample_rate,
            tempo: 1.0,
            search_mode: SearchMode::default(),
            sequence_ms: 0.0,
            seek_window_ms: 0.0,
            overlap_ms: DEFAULT_OVERLAP_MS,
            auto_sequence: true,
            auto_seek_window: true,
            overlap_length: 0,
            seek_window_length: 0,
            seek_length: 0,
            sample_req: 0,
            nominal_skip: 0.0,
            skip_fract: 0.0,
            mid_buffer: Vec::new(),
            primed: false,
            ref_mid_buffer: Vec::new(),
        };
        stretch.set_parameters(sample_rate, 0.0, 0.0, DEFAULT_OVERLAP_MS);
        stretch
    }

    /// Set the sample rate and window durations.
    ///
    /// A zero `sample_rate` or non-positive `overlap_ms` keeps the previous
    /// value. A non-positive `sequence_ms` or `seek_window_ms` switches that
    /// duration to tempo-derived.
    pub fn set_parameters(
        &mut self,
        sample_rate: u32,
        sequence_ms: f64,
        seek_window_ms: f64,
        overlap_ms: f64,
    ) {
        if sample_rate > 0 {
            self.sample_rate = sample_rate;
        }
        if overlap_ms > 0.0 {
            self.overlap_ms = overlap_ms;
        }
        self.auto_sequence = sequence_ms <= 0.0;
        if !self.auto_sequence {
            self.sequence_ms = sequence_ms;
        }
        self.auto_seek_window = seek_window_ms <= 0.0;
        if !self.auto_seek_window {
            self.seek_window_ms = seek_window_ms;
        }

        let overlap_length = overlap_frames(self.sample_rate, self.overlap_ms);
        if overlap_length != self.overlap_length {
            self.overlap_length = overlap_length;
            self.mid_buffer = vec![0.0; overlap_length * CHANNELS];
            self.ref_mid_buffer = vec![0.0; overlap_length * CHANNELS];
            self.primed = false;
        }
        self.set_tempo(self.tempo);
    }

    /// Set the tempo and recompute every derived length.
    ///
    /// Resets the fractional skip carry.
    pub fn set_tempo(&mut self, tempo: f64) {
        debug_assert!(tempo.is_finite() && tempo > 0.0, "tempo must be positive: {tempo}");
        self.tempo = tempo;
        self.calculate_sequence_parameters();

        let window = (self.seek_window_length - self.overlap_length) as f64;
        self.nominal_skip = tempo * window;
        self.skip_fract = 0.0;
        let int_skip = self.nominal_skip.round() as usize;
        self.sample_req =
            (int_skip + self.overlap_length).max(self.seek_window_length) + self.seek_length;

        tracing::debug!(
            tempo,
            sequence_ms = self.sequence_ms,
            seek_window_ms = self.seek_window_ms,
            overlap = self.overlap_length,
            sample_req = self.sample_req,
            "stretch parameters recalculated"
        );
    }

    fn calculate_sequence_parameters(&mut self) {
        if self.auto_sequence {
            self.sequence_ms = auto_sequence_ms(self.tempo);
        }
        if self.auto_seek_window {
            self.seek_window_ms = auto_seek_window_ms(self.tempo);
        }
        // Keeps `seek_window_length - overlap_length` in `set_tempo` and the
        // straight-copy length from underflowing when a short sequence is set.
        self.seek_window_length =
            ms_to_frames(self.sample_rate, self.sequence_ms).max(2 * self.overlap_length);
        self.seek_length = ms_to_frames(self.sample_rate, self.seek_window_ms).max(1);
    }

    #[inline]
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search_mode = mode;
    }

    /// `true` selects [`SearchMode::Quick`], `false` [`SearchMode::Exhaustive`].
    pub fn set_quick_seek(&mut self, quick: bool) {
        self.search_mode = if quick {
            SearchMode::Quick
        } else {
            SearchMode::Exhaustive
        };
    }

    pub fn sequence_ms(&self) -> f64 {
        self.sequence_ms
    }

    pub fn seek_window_ms(&self) -> f64 {
        self.seek_window_ms
    }

    pub fn overlap_ms(&self) -> f64 {
        self.overlap_ms
    }

    #[inline]
    pub fn overlap_length(&self) -> usize {
        self.overlap_length
    }

    #[inline]
    pub fn seek_window_length(&self) -> usize {
        self.seek_window_length
    }

    #[inline]
    pub fn seek_length(&self) -> usize {
        self.seek_length
    }

    /// Frames that must be buffered before a cycle runs.
    #[inline]
    pub fn input_chunk_size(&self) -> usize {
        self.sample_req
    }

    /// Frames emitted by one cycle.
    #[inline]
    pub fn output_chunk_size(&self) -> usize {
        self.overlap_length
            + self
                .seek_window_length
                .saturating_sub(2 * self.overlap_length)
    }

    /// Cross-fade `mid_buffer` into the input window at `offset`.
    fn overlap_add(&self, input: &[f32], offset: usize, dst: &mut [f32]) {
        let scale = 1.0 / self.overlap_length as f32;
        let start = offset * CHANNELS;
        let window = &input[start..start + self.overlap_length * CHANNELS];
        for (i, ((out, new), old)) in dst
            .chunks_exact_mut(CHANNELS)
            .zip(window.chunks_exact(CHANNELS))
            .zip(self.mid_buffer.chunks_exact(CHANNELS))
            .enumerate()
        {
            let fade_in = i as f32 * scale;
            let fade_out = (self.overlap_length - i) as f32 * scale;
            out[0] = new[0] * fade_in + old[0] * fade_out;
            out[1] = new[1] * fade_in + old[1] * fade_out;
        }
    }
}

impl Stage for TimeStretch {
    fn process(&mut self, input: &mut FifoSampleBuffer, output: &mut FifoSampleBuffer) {
        let overlap = self.overlap_length;

        if !self.primed {
            if input.frame_count() < overlap {
                return;
            }
            input.receive_samples(&mut self.mid_buffer, overlap);
            self.primed = true;
        }

        while input.frame_count() >= self.sample_req {
            weighted_reference(&self.mid_buffer, &mut self.ref_mid_buffer);
            let offset = seek_best_overlap(
                self.search_mode,
                input.samples(),
                &self.ref_mid_buffer,
                self.seek_length,
            );

            self.overlap_add(input.samples(), offset, output.tail_mut(overlap));
            output.put(overlap);

            let straight = self.seek_window_length.saturating_sub(2 * overlap);
            if straight > 0 {
                output.put_buffer(input, offset + overlap, Some(straight));
            }

            let tail = (offset + self.seek_window_length - overlap) * CHANNELS;
            self.mid_buffer
                .copy_from_slice(&input.samples()[tail..tail + overlap * CHANNELS]);

            self.skip_fract += self.nominal_skip;
            let skip = self.skip_fract.floor();
            self.skip_fract -= skip;
            input.receive(Some(skip as usize));
        }
    }

    fn clear(&mut self) {
        self.mid_buffer.fill(0.0);
        self.primed = false;
        self.skip_fract = 0.0;
    }

    fn input_chunk_size(&self) -> usize {
        TimeStretch::input_chunk_size(self)
    }
}
