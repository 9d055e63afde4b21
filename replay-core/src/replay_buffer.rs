//! A multi-channel replay buffer with uniform random sampling.
mod base;
mod batch;
mod config;
mod snapshot;
pub use base::ReplayBuffer;
pub use batch::SampleBatch;
pub use config::ReplayBufferConfig;
pub use snapshot::{ReplayBufferSnapshot, SNAPSHOT_VERSION};
