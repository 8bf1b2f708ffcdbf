//! MPEG audio frame location and header decoding.
//!
//! Frame location is a pure function of `(bytes, position)`: the caller owns
//! the cursor and decides how far to advance after each result.

mod header;
mod tables;

pub use header::{ChannelMode, FrameHeader, Layer, Version, FRAME_SYNC, HEADER_SIZE};

use crate::{Error, Result};

/// A frame header located in a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Byte offset of the header's first byte.
    pub offset: usize,
    /// Bytes skipped between the search position and `offset`.
    pub skipped: usize,
    pub header: FrameHeader,
}

impl Frame {
    /// Frame size in bytes, zero for a bad frame.
    pub fn size(&self) -> u32 {
        self.header.frame_size()
    }
}

/// Outcome of searching for the next frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// A usable frame.
    Header(Frame),
    /// Sync was found but the header fields are inconsistent. The caller
    /// should advance a single byte and search again.
    BadFrame(Frame),
    /// Fewer than four bytes remain and no sync was found.
    EndOfStream,
}

/// Find and decode the next frame header at or after `pos`.
///
/// On a sync mismatch the search shifts by one byte, so any corruption is
/// resynchronized at byte granularity.
pub fn decode_next(data: &[u8], pos: usize) -> FrameEvent {
    let mut cursor = pos;

    while let Some(word) = data.get(cursor..cursor.saturating_add(HEADER_SIZE)) {
        if let Some(header) = FrameHeader::decode([word[0], word[1], word[2], word[3]]) {
            let frame = Frame {
                offset: cursor,
                skipped: cursor - pos,
                header,
            };
            if frame.skipped > 0 {
                tracing::debug!(
                    "Header found at offset of {} from expected point @{:#x}",
                    frame.skipped,
                    cursor
                );
            }
            return if header.is_bad() {
                FrameEvent::BadFrame(frame)
            } else {
                FrameEvent::Header(frame)
            };
        }
        cursor += 1;
    }

    FrameEvent::EndOfStream
}

/// Locate the first usable frame in the stream.
///
/// Bad frames before it are stepped over. Fails with [`Error::Format`] if
/// the stream holds no usable frame at all.
pub fn first_frame(data: &[u8]) -> Result<Frame> {
    Frames::new(data)
        .find_map(|event| match event {
            FrameEvent::Header(frame) => Some(frame),
            _ => None,
        })
        .ok_or(Error::Format {
            scanned: data.len() as u64,
        })
}

/// Iterator over every frame event in a byte slice.
///
/// Advances by the decoded frame size after a good frame and by one byte
/// after a bad one. Ends at [`FrameEvent::EndOfStream`], which is not
/// yielded.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Frames<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::starting_at(data, 0)
    }

    pub fn starting_at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for Frames<'_> {
    type Item = FrameEvent;

    fn next(&mut self) -> Option<FrameEvent> {
        let event = decode_next(self.data, self.pos);
        match event {
            FrameEvent::Header(frame) => {
                self.pos = frame.offset.saturating_add(frame.size() as usize);
            }
            FrameEvent::BadFrame(frame) => {
                self.pos = frame.offset + 1;
            }
            FrameEvent::EndOfStream => {
                self.pos = self.data.len();
                return None;
            }
        }
        Some(event)
    }
}
