//! Growable interleaved sample FIFO.
//!
//! Samples are stored as stereo frames (two interleaved `f32` per frame).
//! The unread window is `[position, position + frame_count)` in frames.
//! Writers either append through [`FifoSampleBuffer::put_samples`] /
//! [`FifoSampleBuffer::put_buffer`], or fill the slice returned by
//! [`FifoSampleBuffer::tail_mut`] and then commit it with
//! [`FifoSampleBuffer::put`].

/// Interleaved samples per frame.
pub const CHANNELS: usize = 2;

/// Smallest allocation made when the buffer first grows, in samples.
const MIN_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct FifoSampleBuffer {
    storage: Vec<f32>,
    position: usize,
    frame_count: usize,
}

impl FifoSampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(frames: usize) -> Self {
        Self {
            storage: vec![0.0; frames * CHANNELS],
            position: 0,
            frame_count: 0,
        }
    }

    /// Read offset in frames.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Frames available for reading.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Capacity in frames.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len() / CHANNELS
    }

    #[inline]
    pub fn start_index(&self) -> usize {
        self.position * CHANNELS
    }

    #[inline]
    pub fn end_index(&self) -> usize {
        (self.position + self.frame_count) * CHANNELS
    }

    /// Unread samples, interleaved.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.storage[self.start_index()..self.end_index()]
    }

    pub fn clear(&mut self) {
        self.receive(None);
        self.rewind();
    }

    /// Make room for `frames` more frames and return the writable tail.
    ///
    /// Nothing becomes readable until [`put`](Self::put) commits it.
    pub fn tail_mut(&mut self, frames: usize) -> &mut [f32] {
        self.ensure_additional_capacity(frames);
        let end = self.end_index();
        &mut self.storage[end..end + frames * CHANNELS]
    }

    /// Commit `frames` frames written into the tail.
    ///
    /// Clamped to the allocated capacity.
    pub fn put(&mut self, frames: usize) {
        let room = self.capacity() - self.position - self.frame_count;
        debug_assert!(frames <= room, "put past capacity: {frames} > {room}");
        self.frame_count += frames.min(room);
    }

    /// Append frames from an interleaved slice.
    ///
    /// `frames = None` takes everything in `source` after `offset` frames.
    /// Requests past the end of `source` are clamped.
    pub fn put_samples(&mut self, source: &[f32], offset: usize, frames: Option<usize>) {
        let start = (offset * CHANNELS).min(source.len());
        let available = (source.len() - start) / CHANNELS;
        let frames = frames.map_or(available, |n| n.min(available));
        if frames == 0 {
            return;
        }
        let len = frames * CHANNELS;
        self.tail_mut(frames)
            .copy_from_slice(&source[start..start + len]);
        self.frame_count += frames;
    }

    /// Append unread frames of another FIFO without consuming them there.
    pub fn put_buffer(&mut self, other: &FifoSampleBuffer, offset: usize, frames: Option<usize>) {
        self.put_samples(other.samples(), offset, frames);
    }

    /// Consume frames from the front. `None` or an oversized request
    /// consumes everything available.
    pub fn receive(&mut self, frames: Option<usize>) {
        let frames = frames.map_or(self.frame_count, |n| n.min(self.frame_count));
        self.frame_count -= frames;
        self.position += frames;
    }

    /// Copy `frames` frames into `dest` and consume them.
    ///
    /// Returns the number of frames moved.
    pub fn receive_samples(&mut self, dest: &mut [f32], frames: usize) -> usize {
        let moved = self.extract(dest, 0, frames);
        self.receive(Some(moved));
        moved
    }

    /// Copy frames starting `offset` frames into the unread window without
    /// consuming them. Returns the number of frames copied, bounded by both
    /// the unread window and `dest`.
    pub fn extract(&self, dest: &mut [f32], offset: usize, frames: usize) -> usize {
        let frames = frames
            .min(self.frame_count.saturating_sub(offset))
            .min(dest.len() / CHANNELS);
        if frames == 0 {
            return 0;
        }
        let start = self.start_index() + offset * CHANNELS;
        let len = frames * CHANNELS;
        dest[..len].copy_from_slice(&self.storage[start..start + len]);
        frames
    }

    /// Guarantee room for `frames` total frames from the read position.
    ///
    /// Grows by doubling when short, keeping only the unread window;
    /// otherwise compacts in place.
    pub fn ensure_capacity(&mut self, frames: usize) {
        let required = frames * CHANNELS;
        if self.storage.len() < required {
            let mut new_len = self.storage.len().max(MIN_CAPACITY);
            while new_len < required {
                new_len *= 2;
            }
            let mut storage = vec![0.0; new_len];
            let unread = self.samples();
            storage[..unread.len()].copy_from_slice(unread);
            self.storage = storage;
            self.position = 0;
        } else {
            self.rewind();
        }
    }

    pub fn ensure_additional_capacity(&mut self, frames: usize) {
        self.ensure_capacity(self.frame_count + frames);
    }

    /// Move the unread window to the start of storage.
    pub fn rewind(&mut self) {
        if self.position > 0 {
            let (start, end) = (self.start_index(), self.end_index());
            self.storage.copy_within(start..end, 0);
            self.position = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn staircase(frames: usize) -> Vec<f32> {
        (0..frames * CHANNELS).map(|i| i as f32).collect()
    }

    #[test]
    fn test_new_is_empty() {
        let fifo = FifoSampleBuffer::new();
        assert!(fifo.is_empty());
        assert_eq!(fifo.position(), 0);
        assert_eq!(fifo.capacity(), 0);
    }

    #[test]
    fn test_put_samples_all() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(10), 0, None);
        assert_eq!(fifo.frame_count(), 10);
        assert_eq!(fifo.samples(), staircase(10).as_slice());
    }

    #[test]
    fn test_put_samples_with_offset() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(10), 4, Some(3));
        assert_eq!(fifo.frame_count(), 3);
        assert_eq!(fifo.samples(), &[8.0, 9.0, 10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_put_samples_clamps_to_source() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(4), 2, Some(100));
        assert_eq!(fifo.frame_count(), 2);
        fifo.put_samples(&staircase(4), 9, None);
        assert_eq!(fifo.frame_count(), 2);
    }

    #[test]
    fn test_receive_clamps() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(5), 0, None);
        fifo.receive(Some(2));
        assert_eq!(fifo.frame_count(), 3);
        assert_eq!(fifo.position(), 2);
        fifo.receive(Some(50));
        assert_eq!(fifo.frame_count(), 0);
        assert_eq!(fifo.position(), 5);
    }

    #[test]
    fn test_receive_hides_consumed_frames() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(8), 0, None);
        fifo.receive(Some(3));
        let mut dest = vec![0.0; 2];
        assert_eq!(fifo.extract(&mut dest, 0, 1), 1);
        assert_eq!(dest, vec![6.0, 7.0]);
    }

    #[test]
    fn test_receive_samples_moves_data() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(4), 0, None);
        let mut dest = vec![0.0; 4];
        assert_eq!(fifo.receive_samples(&mut dest, 2), 2);
        assert_eq!(dest, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(fifo.frame_count(), 2);
    }

    #[test]
    fn test_extract_past_end_is_bounded() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(3), 0, None);
        let mut dest = vec![-1.0; 8];
        assert_eq!(fifo.extract(&mut dest, 2, 4), 1);
        assert_eq!(&dest[..2], &[4.0, 5.0]);
        assert_eq!(&dest[2..], &[-1.0; 6]);
        assert_eq!(fifo.extract(&mut dest, 7, 1), 0);
    }

    #[test]
    fn test_growth_doubles_and_preserves_unread() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(40), 0, None);
        let cap = fifo.capacity();
        assert!(cap >= 40);
        assert!((cap * CHANNELS).is_power_of_two());

        fifo.receive(Some(30));
        fifo.put_samples(&staircase(cap), 0, None);
        assert_eq!(fifo.position(), 0);
        assert_eq!(fifo.frame_count(), 10 + cap);
        assert_eq!(fifo.samples()[0], 60.0);
        assert_eq!(fifo.samples()[20], 0.0);
    }

    #[test]
    fn test_ensure_capacity_rewinds_when_large_enough() {
        let mut fifo = FifoSampleBuffer::with_capacity(32);
        fifo.put_samples(&staircase(10), 0, None);
        fifo.receive(Some(6));
        fifo.ensure_capacity(8);
        assert_eq!(fifo.capacity(), 32);
        assert_eq!(fifo.position(), 0);
        assert_eq!(fifo.samples(), &[12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0]);
    }

    #[test]
    fn test_tail_mut_and_put() {
        let mut fifo = FifoSampleBuffer::new();
        let tail = fifo.tail_mut(2);
        tail.copy_from_slice(&[0.5, -0.5, 0.25, -0.25]);
        assert!(fifo.is_empty());
        fifo.put(2);
        assert_eq!(fifo.samples(), &[0.5, -0.5, 0.25, -0.25]);
    }

    #[test]
    fn test_put_buffer_copies_without_consuming() {
        let mut a = FifoSampleBuffer::new();
        a.put_samples(&staircase(6), 0, None);
        let mut b = FifoSampleBuffer::new();
        b.put_buffer(&a, 2, Some(2));
        assert_eq!(a.frame_count(), 6);
        assert_eq!(b.samples(), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_clear() {
        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(6), 0, None);
        fifo.receive(Some(1));
        fifo.clear();
        assert!(fifo.is_empty());
        assert_eq!(fifo.position(), 0);
    }

    #[test]
    fn test_extract_offset_past_storage_copies_nothing() {
        let mut dest = [-1.0; 4];
        assert_eq!(FifoSampleBuffer::new().extract(&mut dest, 10, 2), 0);

        let mut fifo = FifoSampleBuffer::new();
        fifo.put_samples(&staircase(3), 0, None);
        assert_eq!(fifo.extract(&mut dest, 1000, 2), 0);
        assert_eq!(fifo.extract(&mut dest, 3, 2), 0);
        assert_eq!(dest, [-1.0; 4]);
    }

    proptest! {
        #[test]
        fn prop_put_then_extract_round_trips(
            data in proptest::collection::vec(-1.0f32..1.0, 2..512),
            offset in 0usize..64,
        ) {
            let frames = data.len() / CHANNELS;
            let mut fifo = FifoSampleBuffer::new();
            fifo.put_samples(&data, 0, None);
            prop_assert_eq!(fifo.frame_count(), frames);

            let offset = offset.min(frames);
            let mut dest = vec![0.0; (frames - offset) * CHANNELS];
            let copied = fifo.extract(&mut dest, offset, frames - offset);
            prop_assert_eq!(copied, frames - offset);
            prop_assert_eq!(&dest[..], &data[offset * CHANNELS..frames * CHANNELS]);
        }

        #[test]
        fn prop_invariant_holds_under_mixed_ops(
            ops in proptest::collection::vec((0usize..200, 0usize..200), 1..40),
        ) {
            let mut fifo = FifoSampleBuffer::new();
            let mut written = 0usize;
            let mut consumed = 0usize;
            for (put, take) in ops {
                let chunk: Vec<f32> = (0..put * CHANNELS)
                    .map(|i| (written * CHANNELS + i) as f32)
                    .collect();
                fifo.put_samples(&chunk, 0, None);
                written += put;
                let before = fifo.frame_count();
                fifo.receive(Some(take));
                consumed += take.min(before);

                prop_assert!(fifo.position() + fifo.frame_count() <= fifo.capacity());
                prop_assert_eq!(fifo.frame_count(), written - consumed);
                if let Some(&first) = fifo.samples().first() {
                    prop_assert_eq!(first, (consumed * CHANNELS) as f32);
                }
            }
        }
    }
}
