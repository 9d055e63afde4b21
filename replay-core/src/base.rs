//! Interfaces of experience buffers.
use anyhow::Result;

/// Interface for buffers into which experiences are pushed.
///
/// This is the write side of a buffer, typically driven by the process that
/// interacts with an environment.
pub trait ExperienceBufferBase {
    /// Items in the buffer.
    type Item;

    /// Pushes an item into the buffer.
    fn push(&mut self, item: Self::Item) -> Result<()>;

    /// Returns the number of items currently retained.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer retains no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for buffers from which batches are drawn for training.
pub trait ReplayBufferBase {
    /// Configuration of the buffer.
    type Config: Clone;

    /// Batch drawn from the buffer.
    type Batch;

    /// Builds an instance of the buffer.
    ///
    /// Fails if the configuration is rejected.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Draws a batch of at most `size` entries from the buffer.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
