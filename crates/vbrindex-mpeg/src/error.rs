//! Error types for vbrindex-mpeg.

use std::io;
use thiserror::Error;

/// Result type for vbrindex-mpeg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for vbrindex-mpeg operations.
///
/// A single corrupt frame is not an error: the scanner reports it as
/// [`FrameEvent::BadFrame`](crate::FrameEvent::BadFrame) and resynchronizes.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred, including short reads inside a structure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No usable frame was found before the end of the stream.
    #[error("Not an MPEG audio stream: no usable frame found in {scanned} bytes")]
    Format { scanned: u64 },

    /// No seek-table geometry satisfies the size constraints.
    #[error(
        "Failed to find proper number of frames for file: {frames} frames, \
         table size must be within {min_table_size}..={max_table_size}"
    )]
    Sizing {
        frames: u32,
        min_table_size: u32,
        max_table_size: u32,
    },

    /// A VBRI chunk was found but its contents are unusable.
    #[error("Invalid VBRI index at byte {offset}: {reason}")]
    InvalidIndex { offset: u64, reason: String },

    /// The VBRI chunk does not fit inside the frame that carries it.
    #[error("VBRI chunk needs {need} bytes but the index frame holds {have}")]
    IndexOverflow { need: usize, have: usize },

    /// The scan result and table plan disagree with the data being written.
    #[error("Frame count mismatch: plan covers {planned} frames, stream has {actual}")]
    FrameCountMismatch { planned: u64, actual: u64 },
}

impl Error {
    /// Create an invalid index error.
    pub fn invalid_index(offset: u64, reason: impl Into<String>) -> Self {
        Self::InvalidIndex {
            offset,
            reason: reason.into(),
        }
    }
}
