//! Whole-stream frame scanning.

use std::path::Path;

use crate::frame::{first_frame, FrameEvent, FrameHeader, Frames};
use crate::Result;

/// Aggregate statistics from one linear pass over a stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ScanResult {
    /// Input size in bytes.
    pub file_size: u64,
    /// Number of usable frames. Bad frames are excluded and counted in
    /// `bad_frames` instead.
    pub frame_count: u32,
    /// Playback duration in seconds.
    pub duration_secs: f64,
    /// Frames whose header had sync but could not be sized.
    pub bad_frames: u32,
    /// Bytes stepped over while resynchronizing.
    pub skipped_bytes: u64,
    /// Offset of the first usable frame.
    pub first_frame_offset: usize,
    /// Header of the first usable frame. Layer, version and sampling rate
    /// are taken from it for duration and table sizing.
    pub first_header: FrameHeader,
}

impl ScanResult {
    /// Samples per frame of the stream's layer/version.
    pub fn samples_per_frame(&self) -> u32 {
        self.first_header.samples_per_frame()
    }

    /// Sampling rate of the stream in Hz.
    pub fn sampling_rate(&self) -> u32 {
        self.first_header.sampling_rate()
    }

    /// Theoretical largest frame for the stream's layer/version.
    pub fn max_frame_size(&self) -> u32 {
        self.first_header.max_frame_size()
    }
}

/// Scan a stream held in memory.
///
/// Fails with [`Error::Format`](crate::Error::Format) if the stream contains
/// no usable frame. Bad frames are logged and skipped a byte at a time.
pub fn scan(data: &[u8]) -> Result<ScanResult> {
    let first = first_frame(data)?;

    let mut frame_count = 0u32;
    let mut bad_frames = 0u32;
    let mut skipped_bytes = 0u64;

    for event in Frames::new(data) {
        match event {
            FrameEvent::Header(frame) => {
                frame_count += 1;
                skipped_bytes += frame.skipped as u64;
            }
            FrameEvent::BadFrame(frame) => {
                tracing::warn!(
                    "Found a bad frame at frame {}, byte {}",
                    frame_count,
                    frame.offset
                );
                bad_frames += 1;
                skipped_bytes += frame.skipped as u64;
            }
            FrameEvent::EndOfStream => break,
        }
    }

    let header = first.header;
    let duration_secs =
        frame_count as f64 * header.samples_per_frame() as f64 / header.sampling_rate() as f64;

    tracing::debug!(
        "Scanned {} frames ({} bad) over {} bytes, {:.3}s",
        frame_count,
        bad_frames,
        data.len(),
        duration_secs
    );

    Ok(ScanResult {
        file_size: data.len() as u64,
        frame_count,
        duration_secs,
        bad_frames,
        skipped_bytes,
        first_frame_offset: first.offset,
        first_header: header,
    })
}

/// Read a file into memory and scan it.
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<ScanResult> {
    let data = std::fs::read(path.as_ref())?;
    scan(&data)
}
