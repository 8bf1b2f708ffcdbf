//! VBRI seek-table geometry.
//!
//! The table has to fit inside a single frame, which caps the number of
//! entries. When the stream has more frames than that, several frames share
//! an entry, and a few delay frames may be added so the total divides evenly.

use crate::vbri::{writable_table_size, CHUNK_OFFSET, HEADER_SIZE};
use crate::{Error, Result};

/// Tunables for the sizing search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingParams {
    /// Target audio bytes covered by one entry; sets the minimum table size.
    pub bytes_per_entry: u32,
    /// Largest number of delay frames the search may add.
    pub max_delay_frames: u32,
    /// Extra cap on the entry count, applied below [`max_table_size`].
    pub entry_limit: Option<u32>,
}

impl SizingParams {
    /// Cap the entry count so the table fits the index frame that
    /// [`write_indexed`](crate::write_indexed) emits for `max_frame_size`.
    pub fn fitting_index_frame(self, max_frame_size: u32) -> Self {
        Self {
            entry_limit: Some(writable_table_size(max_frame_size)),
            ..self
        }
    }
}

impl Default for SizingParams {
    fn default() -> Self {
        Self {
            bytes_per_entry: 50_000,
            max_delay_frames: 10,
            entry_limit: None,
        }
    }
}

/// A feasible seek-table geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TablePlan {
    pub min_table_size: u32,
    pub max_table_size: u32,
    /// Number of table entries.
    pub table_size: u32,
    pub frames_per_entry: u32,
    /// Frames inserted ahead of the audio, the first of which carries the
    /// index itself.
    pub delay_frames: u32,
    /// Input frames plus delay frames.
    pub output_frames: u32,
}

/// Largest entry count a frame of `max_frame_size` bytes can hold with
/// 16-bit entries.
pub fn max_table_size(max_frame_size: u32) -> u32 {
    max_frame_size
        .saturating_add(1)
        .saturating_sub(CHUNK_OFFSET as u32 + HEADER_SIZE as u32)
        / 2
}

/// Choose table size, frames per entry and delay frames for `frames` input
/// frames.
///
/// The search runs delay frames in the outer loop and divisors in the inner
/// loop, both ascending, and takes the first fit. Changing that order
/// changes the output for the same input.
pub fn plan_table(
    frames: u32,
    file_size: u64,
    max_frame_size: u32,
    params: &SizingParams,
) -> Result<TablePlan> {
    let max_table_size = match params.entry_limit {
        Some(limit) => max_table_size(max_frame_size).min(limit),
        None => max_table_size(max_frame_size),
    };

    let mut min_table_size =
        u32::try_from(file_size / params.bytes_per_entry.max(1) as u64).unwrap_or(u32::MAX);
    // Small frames can push the ceiling under the heuristic floor
    if min_table_size >= max_table_size {
        min_table_size = 0;
    }
    tracing::debug!(
        "Table size: min[{}] max[{}] for {} frames",
        min_table_size,
        max_table_size,
        frames
    );

    let frames64 = frames as u64;

    // One entry per frame, plus the frame carrying the index
    if frames64 < max_table_size as u64 {
        return Ok(TablePlan {
            min_table_size,
            max_table_size,
            table_size: frames + 1,
            frames_per_entry: 1,
            delay_frames: 1,
            output_frames: frames + 1,
        });
    }

    for delay_frames in 1..=params.max_delay_frames {
        let total = frames64 + delay_frames as u64;
        for per_entry in 2..frames64 {
            if total % per_entry != 0 {
                continue;
            }
            let candidate = total / per_entry;
            if candidate >= min_table_size as u64 && candidate <= max_table_size as u64 {
                let plan = TablePlan {
                    min_table_size,
                    max_table_size,
                    table_size: candidate as u32,
                    frames_per_entry: per_entry as u32,
                    delay_frames,
                    output_frames: total as u32,
                };
                tracing::debug!(
                    "Table of {} entries x {} frames, {} delay frames, {} output frames",
                    plan.table_size,
                    plan.frames_per_entry,
                    plan.delay_frames,
                    plan.output_frames
                );
                return Ok(plan);
            }
        }
    }

    Err(Error::Sizing {
        frames,
        min_table_size,
        max_table_size,
    })
}
