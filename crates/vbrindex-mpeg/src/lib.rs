//! # vbrindex-mpeg
//!
//! MPEG audio frame analysis and VBRI seek indexes, in pure Rust.
//!
//! ## Modules
//!
//! - `frame` - frame-sync search and 32-bit header decoding with byte-level
//!   resynchronization
//! - `scan` - one linear pass over a stream for frame count and duration
//! - `sizing` - seek-table geometry (entries, frames per entry, delay frames)
//! - `vbri` - reading an existing VBRI chunk and writing a new one
//!
//! ## Example
//!
//! ```no_run
//! use vbrindex_mpeg::{plan_table, scan, SeekIndex, SizingParams};
//!
//! let data = std::fs::read("song.mp3").unwrap();
//! let result = scan(&data).unwrap();
//! println!("{} frames, {:.1}s", result.frame_count, result.duration_secs);
//!
//! let plan = plan_table(
//!     result.frame_count,
//!     result.file_size,
//!     result.max_frame_size(),
//!     &SizingParams::default(),
//! )
//! .unwrap();
//! println!("{} entries x {} frames", plan.table_size, plan.frames_per_entry);
//!
//! if let Some(index) = SeekIndex::locate(&data).unwrap() {
//!     let point = index.closest_offset_before(30.0);
//!     println!("30s -> byte {} ({:.2}s)", point.offset, point.time);
//! }
//! ```

pub mod error;
pub mod frame;
pub mod scan;
pub mod sizing;
pub mod vbri;

pub use error::{Error, Result};
pub use frame::{decode_next, first_frame, Frame, FrameEvent, FrameHeader, Frames, Layer, Version};
pub use scan::{scan, scan_file, ScanResult};
pub use sizing::{max_table_size, plan_table, SizingParams, TablePlan};
pub use vbri::{
    writable_table_size, write_indexed, IndexOptions, SeekIndex, SeekPoint, VbriHeader, WriteSummary,
};
