//! VBRI chunk reader and time-to-offset lookup.

use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom};

use super::{VbriHeader, CHUNK_OFFSET, MAGIC};
use crate::frame::{first_frame, FrameHeader, HEADER_SIZE as FRAME_HEADER_SIZE};
use crate::{Error, Result};

/// A position in the stream reachable through the seek index.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct SeekPoint {
    /// Byte offset relative to the start of the frame carrying the index.
    pub offset: u64,
    /// Playback time at that offset, in seconds.
    pub time: f64,
}

/// A loaded VBRI seek index.
#[derive(Debug, Clone)]
pub struct SeekIndex {
    header: VbriHeader,
    entries: Vec<u32>,
    base_offset: u64,
    total_play_time: f64,
    time_per_entry: f64,
}

impl SeekIndex {
    /// Read the index carried by the frame at the reader's current position.
    ///
    /// Returns `Ok(None)` when the frame carries no VBRI tag. Once the tag
    /// matched, any short read is an error.
    pub fn read_from<R: Read + Seek>(reader: &mut R, frame: &FrameHeader) -> Result<Option<Self>> {
        let base_offset = reader.stream_position()?;
        reader.seek(SeekFrom::Current((FRAME_HEADER_SIZE + CHUNK_OFFSET) as i64))?;

        let mut tag = [0u8; 4];
        match reader.read_exact(&mut tag) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        if &tag != MAGIC {
            return Ok(None);
        }

        let header = VbriHeader {
            version: read_u16(reader)?,
            delay: read_u16(reader)?,
            quality: read_u16(reader)?,
            total_bytes: read_u32(reader)?,
            total_frames: read_u32(reader)?,
            entry_count: read_u16(reader)?,
            scale_factor: read_u16(reader)?,
            entry_width: read_u16(reader)?,
            frames_per_entry: read_u16(reader)?,
        };

        if !matches!(header.entry_width, 1 | 2 | 4) {
            return Err(Error::invalid_index(
                base_offset,
                format!("unsupported entry width {}", header.entry_width),
            ));
        }

        let mut entries = Vec::with_capacity(header.entry_count as usize);
        for i in 0..header.entry_count {
            let raw = match header.entry_width {
                1 => read_u8(reader)? as u32,
                2 => read_u16(reader)? as u32,
                _ => read_u32(reader)?,
            };
            let value = raw.checked_mul(header.scale_factor as u32).ok_or_else(|| {
                Error::invalid_index(base_offset, format!("entry {} overflows when scaled", i))
            })?;
            entries.push(value);
        }

        let sampling_rate = frame.sampling_rate();
        if sampling_rate == 0 {
            return Err(Error::invalid_index(
                base_offset,
                "carrying frame has no sampling rate",
            ));
        }
        let total_play_time =
            header.total_frames as f64 * frame.samples_per_frame() as f64 / sampling_rate as f64;
        let time_per_entry = total_play_time / (header.entry_count as f64 + 1.0);

        tracing::debug!(
            "VBRI index at byte {}: {} entries, {:.3}s per entry",
            base_offset,
            header.entry_count,
            time_per_entry
        );

        Ok(Some(Self {
            header,
            entries,
            base_offset,
            total_play_time,
            time_per_entry,
        }))
    }

    /// Read the index behind the first usable frame of an in-memory stream.
    pub fn locate(data: &[u8]) -> Result<Option<Self>> {
        let frame = first_frame(data)?;
        let mut cursor = Cursor::new(data);
        cursor.set_position(frame.offset as u64);
        Self::read_from(&mut cursor, &frame.header)
    }

    pub fn header(&self) -> &VbriHeader {
        &self.header
    }

    /// Scaled entries: byte deltas between consecutive seek points.
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// Absolute byte offset of the frame carrying the index.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Total playback time in seconds.
    pub fn total_play_time(&self) -> f64 {
        self.total_play_time
    }

    /// Playback time spanned by each entry, in seconds.
    pub fn time_per_entry(&self) -> f64 {
        self.time_per_entry
    }

    /// Nearest seek point at or before `target` seconds.
    ///
    /// Entries are accumulated until the next one would pass `target`, so
    /// the result never lies after it and never decreases as `target` grows.
    pub fn closest_offset_before(&self, target: f64) -> SeekPoint {
        let mut offset = 0u64;
        let mut time = 0.0f64;

        if self.time_per_entry > 0.0 {
            for &entry in &self.entries {
                if time + self.time_per_entry > target {
                    break;
                }
                time += self.time_per_entry;
                offset += entry as u64;
            }
        }

        SeekPoint { offset, time }
    }
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}
