//! Batches of values drawn from a replay buffer.
use crate::error::ReplayError;

/// A batch of slots drawn from a [ReplayBuffer](super::ReplayBuffer).
///
/// Entry `k` of every channel belongs to the same drawn slot, so the
/// cross-channel alignment of the buffer carries over to the batch. The
/// batch owns clones of the stored values; later insertions into the buffer
/// do not affect it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch<T> {
    channels: Vec<Vec<T>>,
}

impl<T> SampleBatch<T> {
    pub(super) fn new(channels: Vec<Vec<T>>) -> Self {
        Self { channels }
    }

    pub(super) fn empty(channel_count: usize) -> Self {
        Self {
            channels: (0..channel_count).map(|_| Vec::new()).collect(),
        }
    }

    /// The values drawn for one channel, in draw order.
    pub fn channel(&self, index: usize) -> Result<&[T], ReplayError> {
        self.channels
            .get(index)
            .map(|channel| channel.as_slice())
            .ok_or(ReplayError::IndexOutOfRange {
                index,
                count: self.channels.len(),
            })
    }

    /// Number of entries per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Consumes the batch into its per-channel sequences.
    pub fn into_channels(self) -> Vec<Vec<T>> {
        self.channels
    }
}
