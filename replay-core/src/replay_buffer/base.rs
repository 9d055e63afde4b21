//! A multi-channel ring buffer for experience replay.
use super::{snapshot::SNAPSHOT_VERSION, ReplayBufferConfig, ReplayBufferSnapshot, SampleBatch};
use crate::{error::ReplayError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// A fixed-capacity store of logical items, each an aligned tuple of values
/// spread over a fixed number of parallel channels.
///
/// While the buffer is filling, every insertion appends one slot to every
/// channel. Once `capacity` items are retained, each insertion overwrites
/// the slot at the write cursor in every channel, so the oldest retained
/// item is always the next to be evicted. A single cursor drives both
/// phases; it advances modulo `capacity` on every insertion, which makes
/// the eviction order correct at the moment the buffer transitions from
/// growing to full.
///
/// Channel alignment is structural: no single-channel mutator exists, so
/// slot `i` holds values inserted by the same call in every channel.
///
/// The buffer assumes one logical writer and no reads interleaved with a
/// write mid-call. Callers using it from multiple threads must serialize
/// access externally.
pub struct ReplayBuffer<T> {
    capacity: usize,
    channel_count: usize,
    write_cursor: usize,
    filled: usize,
    channels: Vec<Vec<T>>,
    rng: StdRng,
}

impl<T: Clone> ReplayBuffer<T> {
    /// Creates an empty buffer with the default sampling seed.
    ///
    /// Fails with [`ReplayError::InvalidConfiguration`] if `capacity` or
    /// `channel_count` is zero.
    pub fn new(capacity: usize, channel_count: usize) -> Result<Self, ReplayError> {
        Self::with_seed(capacity, channel_count, ReplayBufferConfig::default().seed)
    }

    fn with_seed(capacity: usize, channel_count: usize, seed: u64) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::InvalidConfiguration(
                "capacity must be positive".into(),
            ));
        }
        if channel_count == 0 {
            return Err(ReplayError::InvalidConfiguration(
                "channel count must be positive".into(),
            ));
        }

        Ok(Self {
            capacity,
            channel_count,
            write_cursor: 0,
            filled: 0,
            channels: (0..channel_count)
                .map(|_| Vec::with_capacity(capacity))
                .collect(),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Inserts one logical item, given as one value per channel.
    ///
    /// While the buffer is below capacity the item occupies a fresh slot;
    /// afterwards it overwrites the oldest retained item. An item with a
    /// mismatched number of values is rejected and leaves the buffer
    /// untouched.
    pub fn insert(&mut self, item: Vec<T>) -> Result<(), ReplayError> {
        if item.len() != self.channel_count {
            return Err(ReplayError::ArityMismatch {
                expected: self.channel_count,
                got: item.len(),
            });
        }

        if self.filled < self.capacity {
            for (channel, value) in self.channels.iter_mut().zip(item) {
                channel.push(value);
            }
            self.filled += 1;
        } else {
            let i = self.write_cursor;
            for (channel, value) in self.channels.iter_mut().zip(item) {
                channel[i] = value;
            }
        }

        // The cursor advances during the growth phase too, so that the first
        // overwrite after reaching capacity lands on the oldest slot.
        self.write_cursor = (self.write_cursor + 1) % self.capacity;

        Ok(())
    }

    /// Draws `size` slots uniformly at random with replacement.
    ///
    /// The request is clamped to the number of retained items; sampling from
    /// an empty buffer yields an empty batch. Entry `k` of every channel in
    /// the returned batch refers to the same drawn slot, and the batch owns
    /// clones, so later overwrites do not affect it.
    pub fn sample(&mut self, size: usize) -> SampleBatch<T> {
        let n = size.min(self.filled);
        if n == 0 {
            return SampleBatch::empty(self.channel_count);
        }

        let ixs = (0..n)
            .map(|_| (self.rng.next_u32() as usize) % self.filled)
            .collect::<Vec<_>>();

        SampleBatch::new(
            self.channels
                .iter()
                .map(|channel| ixs.iter().map(|&ix| channel[ix].clone()).collect())
                .collect(),
        )
    }

    /// Read-only view of one whole channel, in slot order.
    pub fn channel(&self, index: usize) -> Result<&[T], ReplayError> {
        self.channels
            .get(index)
            .map(|channel| channel.as_slice())
            .ok_or(ReplayError::IndexOutOfRange {
                index,
                count: self.channel_count,
            })
    }

    /// Returns the number of items currently retained.
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Returns `true` if no item has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Maximum number of retained items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of parallel channels per item.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Clones the complete stored state into a snapshot.
    pub fn snapshot(&self) -> ReplayBufferSnapshot<T> {
        ReplayBufferSnapshot {
            version: SNAPSHOT_VERSION,
            capacity: self.capacity,
            channel_count: self.channel_count,
            write_cursor: self.write_cursor,
            filled: self.filled,
            channels: self.channels.clone(),
        }
    }

    /// Replaces the buffer's stored state with a previously taken snapshot.
    ///
    /// The snapshot is validated before anything is touched; on error the
    /// buffer keeps its current contents. The sampling rng is not part of
    /// the snapshot and keeps its state.
    pub fn restore(&mut self, snapshot: ReplayBufferSnapshot<T>) -> Result<(), ReplayError> {
        snapshot.validate()?;

        self.capacity = snapshot.capacity;
        self.channel_count = snapshot.channel_count;
        self.write_cursor = snapshot.write_cursor;
        self.filled = snapshot.filled;
        self.channels = snapshot.channels;

        Ok(())
    }
}

impl<T: Clone> ExperienceBufferBase for ReplayBuffer<T> {
    type Item = Vec<T>;

    fn push(&mut self, item: Self::Item) -> Result<()> {
        self.insert(item)?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.filled
    }
}

impl<T: Clone> ReplayBufferBase for ReplayBuffer<T> {
    type Config = ReplayBufferConfig;
    type Batch = SampleBatch<T>;

    fn build(config: &Self::Config) -> Result<Self> {
        let buffer = Self::with_seed(config.capacity, config.channel_count, config.seed)?;
        Ok(buffer)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        Ok(self.sample(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_buffer(capacity: usize, n: usize) -> ReplayBuffer<i64> {
        let mut buffer = ReplayBuffer::new(capacity, 2).unwrap();
        for k in 1..=n {
            buffer.insert(vec![k as i64, 10 * k as i64]).unwrap();
        }
        buffer
    }

    #[test]
    fn rejects_zero_capacity() {
        match ReplayBuffer::<f32>::new(0, 2) {
            Err(ReplayError::InvalidConfiguration(_)) => {}
            _ => panic!("expected InvalidConfiguration"),
        }
    }

    #[test]
    fn rejects_zero_channel_count() {
        match ReplayBuffer::<f32>::new(3, 0) {
            Err(ReplayError::InvalidConfiguration(_)) => {}
            _ => panic!("expected InvalidConfiguration"),
        }
    }

    #[test]
    fn len_saturates_at_capacity() {
        let mut buffer = ReplayBuffer::new(3, 1).unwrap();
        assert_eq!(buffer.len(), 0);
        for k in 0..7 {
            buffer.insert(vec![k]).unwrap();
            assert_eq!(buffer.len(), usize::min(k as usize + 1, 3));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn overwrites_oldest_slot_first() {
        // capacity 3, two channels; the 4th insert wraps and lands on slot 0.
        let mut buffer = ReplayBuffer::new(3, 2).unwrap();
        for (k, s) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")].iter() {
            buffer.insert(vec![k.to_string(), s.to_string()]).unwrap();
        }

        assert_eq!(buffer.channel(0).unwrap(), ["4", "2", "3"]);
        assert_eq!(buffer.channel(1).unwrap(), ["d", "b", "c"]);
    }

    #[test]
    fn evicts_in_insertion_order() {
        // capacity + k inserts leave exactly the last `capacity` items.
        let capacity = 5;
        for k in 1..5 {
            let buffer = filled_buffer(capacity, capacity + k);
            let mut retained = buffer.channel(0).unwrap().to_vec();
            retained.sort_unstable();
            let expected = (k + 1..=capacity + k).map(|v| v as i64).collect::<Vec<_>>();
            assert_eq!(retained, expected);
        }
    }

    #[test]
    fn channels_stay_aligned() {
        let buffer = filled_buffer(4, 11);
        let c0 = buffer.channel(0).unwrap();
        let c1 = buffer.channel(1).unwrap();
        for (a, b) in c0.iter().zip(c1.iter()) {
            assert_eq!(*b, 10 * *a);
        }
    }

    #[test]
    fn arity_mismatch_leaves_buffer_untouched() {
        let mut buffer = ReplayBuffer::new(3, 2).unwrap();
        buffer.insert(vec![1, 2]).unwrap();

        match buffer.insert(vec![1, 2, 3]) {
            Err(ReplayError::ArityMismatch { expected: 2, got: 3 }) => {}
            _ => panic!("expected ArityMismatch"),
        }

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.channel(0).unwrap(), [1]);
        assert_eq!(buffer.channel(1).unwrap(), [2]);

        // The cursor did not advance either: the next insert goes to slot 1.
        buffer.insert(vec![3, 4]).unwrap();
        assert_eq!(buffer.channel(0).unwrap(), [1, 3]);
    }

    #[test]
    fn sample_clamps_to_len() {
        let mut buffer = filled_buffer(5, 2);
        let batch = buffer.sample(10);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.channel_count(), 2);
        for k in 0..batch.len() {
            let v = batch.channel(0).unwrap()[k];
            assert!(v == 1 || v == 2);
            assert_eq!(batch.channel(1).unwrap()[k], 10 * v);
        }
    }

    #[test]
    fn sample_returns_resident_aligned_pairs() {
        let mut buffer = filled_buffer(4, 9);
        let batch = buffer.sample(32);
        assert_eq!(batch.len(), 4);
        for k in 0..batch.len() {
            let v = batch.channel(0).unwrap()[k];
            assert!((6..=9).contains(&v));
            assert_eq!(batch.channel(1).unwrap()[k], 10 * v);
        }
    }

    #[test]
    fn sample_on_empty_buffer_is_empty() {
        let mut buffer = ReplayBuffer::<f32>::new(5, 3).unwrap();
        let batch = buffer.sample(8);
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
        assert_eq!(batch.channel_count(), 3);
        for c in 0..3 {
            assert!(batch.channel(c).unwrap().is_empty());
        }
    }

    #[test]
    fn sample_is_unaffected_by_later_overwrites() {
        let mut buffer = filled_buffer(2, 2);
        let batch = buffer.sample(4);
        let before = batch.channel(0).unwrap().to_vec();
        for k in 100..110 {
            buffer.insert(vec![k, 10 * k]).unwrap();
        }
        assert_eq!(batch.channel(0).unwrap(), before.as_slice());
    }

    #[test]
    fn channel_index_out_of_range() {
        let buffer = ReplayBuffer::<u8>::new(2, 2).unwrap();
        match buffer.channel(2) {
            Err(ReplayError::IndexOutOfRange { index: 2, count: 2 }) => {}
            _ => panic!("expected IndexOutOfRange"),
        }
    }

    #[test]
    fn build_from_config() {
        let config = ReplayBufferConfig::default()
            .capacity(7)
            .channel_count(3)
            .seed(1);
        let buffer = <ReplayBuffer<f32> as ReplayBufferBase>::build(&config).unwrap();
        assert_eq!(buffer.capacity(), 7);
        assert_eq!(buffer.channel_count(), 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn build_rejects_zero_capacity_config() {
        let config = ReplayBufferConfig::default().capacity(0);
        assert!(<ReplayBuffer<f32> as ReplayBufferBase>::build(&config).is_err());
    }

    #[test]
    fn push_through_trait_seam() {
        let mut buffer = ReplayBuffer::new(3, 2).unwrap();
        ExperienceBufferBase::push(&mut buffer, vec![1.0f32, 2.0]).unwrap();
        assert_eq!(ExperienceBufferBase::len(&buffer), 1);
        assert!(ExperienceBufferBase::push(&mut buffer, vec![1.0f32]).is_err());
    }
}
