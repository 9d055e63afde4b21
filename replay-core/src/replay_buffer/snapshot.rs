//! Versioned serialization of the replay buffer state.
//!
//! A snapshot captures exactly the stored state of a
//! [ReplayBuffer](super::ReplayBuffer): capacity, channel count, channel
//! contents, write cursor and filled count. Restoring checks the format
//! version and the internal consistency of those dimensions before the
//! buffer is touched, so a foreign or corrupted payload fails loudly
//! instead of being merged silently.
use crate::error::ReplayError;
use anyhow::Result;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Format version written by [ReplayBuffer::snapshot](super::ReplayBuffer::snapshot).
pub const SNAPSHOT_VERSION: u32 = 1;

/// Complete stored state of a [ReplayBuffer](super::ReplayBuffer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayBufferSnapshot<T> {
    pub(super) version: u32,
    pub(super) capacity: usize,
    pub(super) channel_count: usize,
    pub(super) write_cursor: usize,
    pub(super) filled: usize,
    pub(super) channels: Vec<Vec<T>>,
}

impl<T> ReplayBufferSnapshot<T> {
    /// Format version the snapshot was recorded with.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of items the snapshot retains.
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Returns `true` if the snapshot retains no items.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub(super) fn validate(&self) -> Result<(), ReplayError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ReplayError::SnapshotVersionMismatch {
                expected: SNAPSHOT_VERSION,
                got: self.version,
            });
        }
        if self.capacity == 0 || self.channel_count == 0 {
            return Err(ReplayError::SnapshotShapeMismatch(
                "capacity and channel count must be positive".into(),
            ));
        }
        if self.channels.len() != self.channel_count {
            return Err(ReplayError::SnapshotShapeMismatch(format!(
                "{} channels stored, channel count says {}",
                self.channels.len(),
                self.channel_count
            )));
        }
        if self.filled > self.capacity {
            return Err(ReplayError::SnapshotShapeMismatch(format!(
                "filled count {} exceeds capacity {}",
                self.filled, self.capacity
            )));
        }
        if self.write_cursor >= self.capacity {
            return Err(ReplayError::SnapshotShapeMismatch(format!(
                "write cursor {} out of range for capacity {}",
                self.write_cursor, self.capacity
            )));
        }
        if self.filled < self.capacity && self.write_cursor != self.filled {
            return Err(ReplayError::SnapshotShapeMismatch(format!(
                "write cursor {} inconsistent with filled count {} of a growing buffer",
                self.write_cursor, self.filled
            )));
        }
        for (i, channel) in self.channels.iter().enumerate() {
            if channel.len() != self.filled {
                return Err(ReplayError::SnapshotShapeMismatch(format!(
                    "channel {} holds {} values, filled count says {}",
                    i,
                    channel.len(),
                    self.filled
                )));
            }
        }
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned> ReplayBufferSnapshot<T> {
    /// Writes the snapshot to `path` as a bincode payload.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(&path)?;
        file.write_all(&bincode::serialize(self)?)?;
        info!("Saved replay buffer snapshot in {:?}.", path.as_ref());
        Ok(())
    }

    /// Reads and validates a snapshot from `path`.
    ///
    /// Version and shape mismatches surface here, before the snapshot gets
    /// anywhere near a buffer.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(&path)?;
        let rdr = BufReader::new(file);
        let snapshot: Self = bincode::deserialize_from(rdr)?;
        snapshot.validate()?;
        info!("Loaded replay buffer snapshot from {:?}.", path.as_ref());
        Ok(snapshot)
    }
}
