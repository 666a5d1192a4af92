//! Best-overlap search by normalized cross-correlation.
//!
//! The reference is the previous window's overlap tail weighted by a
//! triangular window `i * (overlap - i)`; each candidate offset into the
//! input is scored by its correlation with that reference divided by the
//! candidate's RMS energy.

use serde::{Deserialize, Serialize};
use tempus_core::CHANNELS;

/// How candidate offsets are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Score every offset in `[0, seek_length)`.
    Exhaustive,
    /// Four coarse-to-fine passes over [`SCAN_OFFSETS`].
    #[default]
    Quick,
}

/// Per-pass offset steps for the quick search. A zero ends the pass.
///
/// Pass 0 is absolute; later passes are relative to the best offset found
/// so far.
pub const SCAN_OFFSETS: [[i32; 24]; 4] = [
    [
        124, 186, 248, 310, 372, 434, 496, 558, 620, 682, 744, 806, 868, 930, 992, 1054, 1116,
        1178, 1240, 1302, 1364, 1426, 1488, 0,
    ],
    [
        -100, -75, -50, -25, 25, 50, 75, 100, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    [
        -20, -15, -10, -5, 5, 10, 15, 20, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    [
        -4, -3, -2, -1, 1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
];

/// Energies below this are treated as unit energy.
const NORM_FLOOR: f32 = 1e-9;

/// Fill `reference` with `mid` weighted by the triangular window.
pub fn weighted_reference(mid: &[f32], reference: &mut [f32]) {
    let overlap = mid.len() / CHANNELS;
    for (i, (dst, src)) in reference
        .chunks_exact_mut(CHANNELS)
        .zip(mid.chunks_exact(CHANNELS))
        .enumerate()
    {
        let weight = (i * (overlap - i)) as f32;
        dst[0] = src[0] * weight;
        dst[1] = src[1] * weight;
    }
}

/// Normalized correlation of `candidate` against `reference`.
///
/// Both are interleaved and the same length.
pub fn cross_correlation(candidate: &[f32], reference: &[f32]) -> f32 {
    let (corr, norm) = candidate
        .iter()
        .zip(reference)
        .fold((0.0f32, 0.0f32), |(corr, norm), (&x, &r)| {
            (corr + x * r, norm + x * x)
        });
    let norm = if norm < NORM_FLOOR { 1.0 } else { norm };
    corr / norm.sqrt()
}

#[inline]
fn score(input: &[f32], reference: &[f32], offset: usize) -> f32 {
    let start = offset * CHANNELS;
    cross_correlation(&input[start..start + reference.len()], reference)
}

/// Best offset in `[0, seek_length)`, scoring every candidate.
///
/// `input` must hold at least `seek_length - 1` frames plus the reference.
/// Ties keep the earliest offset.
pub fn seek_exhaustive(input: &[f32], reference: &[f32], seek_length: usize) -> usize {
    let mut best_offset = 0;
    let mut best_corr = f32::MIN;
    for offset in 0..seek_length {
        let corr = score(input, reference, offset);
        if corr > best_corr {
            best_corr = corr;
            best_offset = offset;
        }
    }
    best_offset
}

/// Best offset in `[0, seek_length)` by hierarchical refinement.
///
/// Approximates [`seek_exhaustive`]: each pass only visits offsets around
/// the previous pass's winner, so a better peak elsewhere can be missed.
pub fn seek_quick(input: &[f32], reference: &[f32], seek_length: usize) -> usize {
    let mut best_offset = 0usize;
    let mut best_corr = f32::MIN;
    let mut center = 0isize;

    for pass in &SCAN_OFFSETS {
        for &step in pass.iter().take_while(|&&step| step != 0) {
            let candidate = center + step as isize;
            if candidate >= seek_length as isize {
                break;
            }
            if candidate < 0 {
                continue;
            }
            let corr = score(input, reference, candidate as usize);
            if corr > best_corr {
                best_corr = corr;
                best_offset = candidate as usize;
            }
        }
        center = best_offset as isize;
    }
    best_offset
}

/// Dispatch on `mode`.
pub fn seek_best_overlap(
    mode: SearchMode,
    input: &[f32],
    reference: &[f32],
    seek_length: usize,
) -> usize {
    match mode {
        SearchMode::Exhaustive => seek_exhaustive(input, reference, seek_length),
        SearchMode::Quick => seek_quick(input, reference, seek_length),
    }
}
