//! VBRI seek index: an auxiliary chunk carried inside the first frame of a
//! variable-bitrate stream.
//!
//! Layout, all big-endian, starting `HEADER_SIZE + CHUNK_OFFSET` bytes into
//! the carrying frame:
//!
//! | field              | bytes |
//! |--------------------|-------|
//! | `"VBRI"`           | 4     |
//! | version            | 2     |
//! | delay              | 2     |
//! | quality            | 2     |
//! | total bytes        | 4     |
//! | total frames       | 4     |
//! | entry count        | 2     |
//! | scale factor       | 2     |
//! | entry width        | 2     |
//! | frames per entry   | 2     |
//!
//! followed by `entry count` entries of `entry width` bytes each.

mod reader;
mod writer;

pub use reader::{SeekIndex, SeekPoint};
pub use writer::{writable_table_size, write_indexed, IndexOptions, WriteSummary};

/// Chunk tag.
pub const MAGIC: &[u8; 4] = b"VBRI";

/// Distance from the end of the frame header to the chunk tag.
pub const CHUNK_OFFSET: usize = 32;

/// Packed chunk header size, tag included.
pub const HEADER_SIZE: usize = 26;

/// Version id written into new chunks.
pub const VBRI_VERSION: u16 = 1;

/// Fixed fields of a VBRI chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct VbriHeader {
    pub version: u16,
    /// Encoder delay in samples.
    pub delay: u16,
    pub quality: u16,
    pub total_bytes: u32,
    pub total_frames: u32,
    pub entry_count: u16,
    /// Multiplier applied to every stored entry.
    pub scale_factor: u16,
    /// Bytes per stored entry: 1, 2 or 4.
    pub entry_width: u16,
    pub frames_per_entry: u16,
}
