//! Test helpers and fixtures for Tempus integration tests
//!
//! Signal generators, level measures and comparisons shared by the test
//! binaries. Tolerances live in [`tolerances`].

#![allow(dead_code)]

pub mod tolerances;

use tempus::prelude::*;

/// Default test sample rate (matches CD audio)
pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Stretcher with default settings.
pub fn test_stretcher() -> Stretcher {
    StretcherBuilder::new()
        .build()
        .expect("Failed to create test stretcher")
}

/// Stretcher with exhaustive or quick offset search.
pub fn test_stretcher_with_search(quick: bool) -> Stretcher {
    StretcherBuilder::new()
        .quick_seek(quick)
        .build()
        .expect("Failed to create test stretcher")
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: u32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Sine scaled to half amplitude, as a mono buffer.
pub fn sine_buffer(frequency: f64, num_samples: usize) -> AudioBuffer {
    let samples = generate_sine(frequency, TEST_SAMPLE_RATE, num_samples)
        .into_iter()
        .map(|s| s * 0.5)
        .collect();
    AudioBuffer::mono(TEST_SAMPLE_RATE, samples).expect("valid buffer")
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 4.0 - 1.0
        })
        .collect()
}

/// Interleave a mono signal into identical stereo frames.
pub fn interleave(mono: &[f32]) -> Vec<f32> {
    mono.iter().flat_map(|&s| [s, s]).collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// RMS of the sample-wise difference of two equally long signals.
pub fn rms_difference(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "length mismatch");
    let diff: Vec<f32> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    rms(&diff)
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Number of sign changes.
pub fn zero_crossings(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
        .count()
}

/// Largest sample-wise deviation and where it occurs.
fn max_deviation(a: &[f32], b: &[f32]) -> (usize, f32) {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .enumerate()
        .fold((0, 0.0), |best, (i, d)| if d > best.1 { (i, d) } else { best })
}

/// Assert equal length and every sample within `epsilon`.
pub fn assert_signals_equal(a: &[f32], b: &[f32], epsilon: f32, context: &str) {
    assert_eq!(a.len(), b.len(), "{context}: length mismatch");
    let (at, deviation) = max_deviation(a, b);
    assert!(
        deviation <= epsilon,
        "{context}: sample {at} off by {deviation:.6} (epsilon {epsilon})"
    );
}

/// Assert the signal peaks at or above `min_peak`.
pub fn assert_not_silent(samples: &[f32], min_peak: f32, context: &str) {
    let level = peak(samples);
    assert!(level >= min_peak, "{context}: peak {level} below {min_peak}");
}

/// Install a test subscriber so `RUST_LOG=tempus_stretch=debug` shows
/// the stretch logs. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
