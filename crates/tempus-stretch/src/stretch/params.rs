//! Window sizing for the stretch engine.
//!
//! The sequence and seek-window durations are interpolated linearly in tempo
//! between two calibration points and clamped to them: slow tempos get long
//! windows, fast tempos get short ones.

/// Tempo at which the `*_AT_MIN` values apply.
pub const AUTOSEQ_TEMPO_LOW: f64 = 0.5;
/// Tempo at which the `*_AT_MAX` values apply.
pub const AUTOSEQ_TEMPO_TOP: f64 = 2.0;

pub const AUTOSEQ_AT_MIN: f64 = 125.0;
pub const AUTOSEQ_AT_MAX: f64 = 50.0;
pub const AUTOSEQ_K: f64 = (AUTOSEQ_AT_MAX - AUTOSEQ_AT_MIN) / (AUTOSEQ_TEMPO_TOP - AUTOSEQ_TEMPO_LOW);
pub const AUTOSEQ_C: f64 = AUTOSEQ_AT_MIN - AUTOSEQ_TEMPO_LOW * AUTOSEQ_K;

pub const AUTOSEEK_AT_MIN: f64 = 25.0;
pub const AUTOSEEK_AT_MAX: f64 = 15.0;
pub const AUTOSEEK_K: f64 =
    (AUTOSEEK_AT_MAX - AUTOSEEK_AT_MIN) / (AUTOSEQ_TEMPO_TOP - AUTOSEQ_TEMPO_LOW);
pub const AUTOSEEK_C: f64 = AUTOSEEK_AT_MIN - AUTOSEQ_TEMPO_LOW * AUTOSEEK_K;

pub const DEFAULT_OVERLAP_MS: f64 = 8.0;

/// Shortest overlap in frames.
pub const MIN_OVERLAP_FRAMES: usize = 16;

/// Overlap lengths are kept a multiple of this many frames.
pub const OVERLAP_GRANULE: usize = 8;

/// Sequence (processing window) duration for `tempo`, in whole milliseconds.
pub fn auto_sequence_ms(tempo: f64) -> f64 {
    let tempo = tempo.clamp(AUTOSEQ_TEMPO_LOW, AUTOSEQ_TEMPO_TOP);
    (AUTOSEQ_C + AUTOSEQ_K * tempo)
        .clamp(AUTOSEQ_AT_MAX, AUTOSEQ_AT_MIN)
        .round()
}

/// Seek window (search range) duration for `tempo`, in whole milliseconds.
pub fn auto_seek_window_ms(tempo: f64) -> f64 {
    let tempo = tempo.clamp(AUTOSEQ_TEMPO_LOW, AUTOSEQ_TEMPO_TOP);
    (AUTOSEEK_C + AUTOSEEK_K * tempo)
        .clamp(AUTOSEEK_AT_MAX, AUTOSEEK_AT_MIN)
        .round()
}

/// Milliseconds to whole frames, rounding down.
pub fn ms_to_frames(sample_rate: u32, ms: f64) -> usize {
    (sample_rate as f64 * ms / 1000.0).floor() as usize
}

/// Overlap length in frames: at least [`MIN_OVERLAP_FRAMES`], floored to a
/// multiple of [`OVERLAP_GRANULE`].
pub fn overlap_frames(sample_rate: u32, overlap_ms: f64) -> usize {
    let frames = ms_to_frames(sample_rate, overlap_ms).max(MIN_OVERLAP_FRAMES);
    frames - frames % OVERLAP_GRANULE
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_calibration_constants() {
        assert_relative_eq!(AUTOSEQ_K, -50.0);
        assert_relative_eq!(AUTOSEQ_C, 150.0);
        assert_relative_eq!(AUTOSEEK_K, -20.0 / 3.0);
        assert_relative_eq!(AUTOSEEK_C, 25.0 + 10.0 / 3.0);
    }

    #[test]
    fn test_auto_sequence_endpoints() {
        assert_eq!(auto_sequence_ms(0.5), 125.0);
        assert_eq!(auto_sequence_ms(1.0), 100.0);
        assert_eq!(auto_sequence_ms(2.0), 50.0);
        // Outside the calibrated range the endpoints hold.
        assert_eq!(auto_sequence_ms(0.1), 125.0);
        assert_eq!(auto_sequence_ms(8.0), 50.0);
    }

    #[test]
    fn test_auto_seek_window_endpoints() {
        assert_eq!(auto_seek_window_ms(0.5), 25.0);
        assert_eq!(auto_seek_window_ms(1.0), 22.0);
        assert_eq!(auto_seek_window_ms(2.0), 15.0);
        assert_eq!(auto_seek_window_ms(4.0), 15.0);
    }

    #[test]
    fn test_auto_lengths_shrink_with_tempo() {
        let mut last_seq = f64::MAX;
        let mut last_seek = f64::MAX;
        for step in 0..=15 {
            let tempo = 0.5 + step as f64 * 0.1;
            let seq = auto_sequence_ms(tempo);
            let seek = auto_seek_window_ms(tempo);
            assert!(seq <= last_seq && seek <= last_seek, "tempo {tempo}");
            last_seq = seq;
            last_seek = seek;
        }
    }

    #[test]
    fn test_overlap_frames() {
        // 352.8 frames -> 352
        assert_eq!(overlap_frames(44100, 8.0), 352);
        assert_eq!(overlap_frames(48000, 8.0), 384);
        // 8000 Hz * 8 ms = 64
        assert_eq!(overlap_frames(8000, 8.0), 64);
        // Tiny overlaps clamp to the minimum.
        assert_eq!(overlap_frames(8000, 0.5), 16);
        // 31250 Hz * 8 ms = 250 -> 248
        assert_eq!(overlap_frames(31250, 8.0), 248);
    }
}
