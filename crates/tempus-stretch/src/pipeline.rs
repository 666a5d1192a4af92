//! Rate transposer and stretch engine composed into one pipe.
//!
//! Callers set virtual rate, tempo and pitch. The pipeline folds them into
//! an effective rate (`rate * pitch`) for the transposer and an effective
//! tempo (`tempo / pitch`) for the stretch engine. When the effective rate
//! is above 1 the transposer shrinks the signal, so it runs last on the
//! already-stretched frames; otherwise it runs first.

use tempus_core::FifoSampleBuffer;

use crate::config::StretchSettings;
use crate::pipe::{SamplePipe, Stage};
use crate::stretch::{SearchMode, TimeStretch};
use crate::transposer::RateTransposer;

/// Changes smaller than this are not pushed to the stages.
const PARAM_EPSILON: f64 = 1e-10;

/// Stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// input -> stretch -> intermediate -> transposer -> output
    StretchFirst,
    /// input -> transposer -> intermediate -> stretch -> output
    #[default]
    TransposeFirst,
}

impl Topology {
    fn for_rate(rate: f64) -> Self {
        if rate > 1.0 {
            Topology::StretchFirst
        } else {
            Topology::TransposeFirst
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    transposer: RateTransposer,
    stretch: TimeStretch,
    input: FifoSampleBuffer,
    intermediate: FifoSampleBuffer,
    output: FifoSampleBuffer,
    topology: Topology,

    virtual_rate: f64,
    virtual_tempo: f64,
    virtual_pitch: f64,
    /// Effective values last pushed to the stages.
    rate: f64,
    tempo: f64,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(TimeStretch::default())
    }
}

fn changed(a: f64, b: f64) -> bool {
    (a - b).abs() > PARAM_EPSILON
}

impl Pipeline {
    /// Wrap a configured stretch engine. All knobs start neutral.
    pub fn new(stretch: TimeStretch) -> Self {
        let mut pipeline = Self {
            transposer: RateTransposer::new(),
            stretch,
            input: FifoSampleBuffer::new(),
            intermediate: FifoSampleBuffer::new(),
            output: FifoSampleBuffer::new(),
            topology: Topology::default(),
            virtual_rate: 1.0,
            virtual_tempo: 1.0,
            virtual_pitch: 1.0,
            rate: 0.0,
            tempo: 0.0,
        };
        pipeline.calculate_effective_rate_and_tempo();
        pipeline
    }

    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self::new(TimeStretch::new(sample_rate))
    }

    fn calculate_effective_rate_and_tempo(&mut self) {
        let tempo = self.virtual_tempo / self.virtual_pitch;
        let rate = self.virtual_rate * self.virtual_pitch;

        if changed(tempo, self.tempo) {
            self.tempo = tempo;
            self.stretch.set_tempo(tempo);
        }
        if changed(rate, self.rate) {
            self.rate = rate;
            self.transposer.set_rate(rate);
        }

        let topology = Topology::for_rate(self.rate);
        if topology != self.topology {
            tracing::debug!(?topology, rate = self.rate, "pipeline topology changed");
            self.topology = topology;
        }
    }

    /// Effective transposer rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Effective stretch tempo.
    #[inline]
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn pitch(&self) -> f64 {
        self.virtual_pitch
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.virtual_rate = rate;
        self.calculate_effective_rate_and_tempo();
    }

    /// Rate as a percentage change: `25.0` plays 25% faster.
    pub fn set_rate_change(&mut self, percent: f64) {
        self.set_rate(1.0 + 0.01 * percent);
    }

    pub fn set_tempo(&mut self, tempo: f64) {
        self.virtual_tempo = tempo;
        self.calculate_effective_rate_and_tempo();
    }

    /// Tempo as a percentage change: `-50.0` halves the tempo.
    pub fn set_tempo_change(&mut self, percent: f64) {
        self.set_tempo(1.0 + 0.01 * percent);
    }

    /// Pitch as a frequency ratio.
    pub fn set_pitch(&mut self, pitch: f64) {
        self.virtual_pitch = pitch;
        self.calculate_effective_rate_and_tempo();
    }

    pub fn set_pitch_octaves(&mut self, octaves: f64) {
        self.set_pitch(octaves.exp2());
    }

    pub fn set_pitch_semitones(&mut self, semitones: f64) {
        self.set_pitch_octaves(semitones / 12.0);
    }

    pub fn stretch(&self) -> &TimeStretch {
        &self.stretch
    }

    /// Push window settings into the stretch stage. The stage keeps the
    /// pipeline's effective tempo.
    pub fn apply_settings(&mut self, settings: &StretchSettings, sample_rate: u32) {
        settings.apply(&mut self.stretch, sample_rate);
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.stretch.set_search_mode(mode);
    }

    pub fn transposer(&self) -> &RateTransposer {
        &self.transposer
    }

    /// Frames waiting between the two stages.
    pub fn intermediate_frames(&self) -> usize {
        self.intermediate.frame_count()
    }
}

impl SamplePipe for Pipeline {
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
        match self.topology {
            Topology::StretchFirst => {
                self.stretch.process(&mut self.input, &mut self.intermediate);
                self.transposer
                    .process(&mut self.intermediate, &mut self.output);
            }
            Topology::TransposeFirst => {
                self.transposer.process(&mut self.input, &mut self.intermediate);
                self.stretch.process(&mut self.intermediate, &mut self.output);
            }
        }
    }

    fn clear(&mut self) {
        self.input.clear();
        self.intermediate.clear();
        self.output.clear();
        self.transposer.clear();
        self.stretch.clear();
    }

    fn input_chunk_size(&self) -> usize {
        self.stretch.input_chunk_size()
    }
}
