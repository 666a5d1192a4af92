//! Tolerance constants for stretch testing.
//!
//! Different operations require different precision levels.

/// Floating point rounding errors (for passthrough, exact gain).
/// Use for operations that should be mathematically exact.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// DSP processing tolerance (interpolation, cross-fades).
pub const DSP_EPSILON: f32 = 1e-4;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Largest RMS difference allowed between quick and exhaustive search
/// output, measured away from the padded tail on a half-scale sine.
pub const SEARCH_RMS_TOLERANCE: f32 = 0.05;

/// Looser bound for the same comparison over the whole output, padded tail
/// included.
pub const SEARCH_RMS_TOLERANCE_WHOLE: f32 = 0.1;
