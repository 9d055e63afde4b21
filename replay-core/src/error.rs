//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Rejected construction parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An inserted item whose number of values differs from the channel count.
    #[error("Arity mismatch: expected {expected} channel values, got {got}")]
    ArityMismatch {
        /// Channel count of the buffer.
        expected: usize,
        /// Number of values in the rejected item.
        got: usize,
    },

    /// A channel index outside `[0, channel_count)`.
    #[error("Channel index out of range: {index} (channel count: {count})")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of channels.
        count: usize,
    },

    /// A snapshot recorded with an incompatible format version.
    #[error("Snapshot version mismatch: expected {expected}, got {got}")]
    SnapshotVersionMismatch {
        /// Version this library writes and reads.
        expected: u32,
        /// Version found in the snapshot.
        got: u32,
    },

    /// A snapshot whose dimensions are internally inconsistent.
    #[error("Snapshot shape mismatch: {0}")]
    SnapshotShapeMismatch(String),
}
