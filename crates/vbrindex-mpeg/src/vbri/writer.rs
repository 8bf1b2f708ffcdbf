//! Emits a stream with a VBRI index frame inserted ahead of the audio.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use super::{VbriHeader, CHUNK_OFFSET, HEADER_SIZE, MAGIC, VBRI_VERSION};
use crate::frame::{FrameEvent, FrameHeader, Frames, HEADER_SIZE as FRAME_HEADER_SIZE};
use crate::scan::ScanResult;
use crate::sizing::TablePlan;
use crate::{Error, Result};

/// Width of every entry this writer emits.
const ENTRY_WIDTH: u16 = 2;

/// Bytes of the index frame taken before the first table entry.
const INDEX_PREFIX: usize = FRAME_HEADER_SIZE + CHUNK_OFFSET + HEADER_SIZE;

/// Largest entry count that fits an index frame of `frame_size` bytes.
///
/// Pass it to the sizer through
/// [`SizingParams::fitting_index_frame`](crate::SizingParams::fitting_index_frame).
pub fn writable_table_size(frame_size: u32) -> u32 {
    (frame_size as usize).saturating_sub(INDEX_PREFIX) as u32 / ENTRY_WIDTH as u32
}

/// Settings for the emitted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Value of the chunk's quality field.
    pub quality: u16,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { quality: 75 }
    }
}

/// What [`write_indexed`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct WriteSummary {
    /// Total bytes written to the output.
    pub bytes_written: u64,
    /// Absolute offset of the index frame in the output.
    pub index_offset: u64,
    /// Size of the index frame and of each silent delay frame.
    pub index_frame_size: u32,
    pub header: VbriHeader,
}

/// Write `data` to `out` with a VBRI index frame and `plan.delay_frames - 1`
/// silent frames inserted before its first frame.
///
/// The inserted frames reuse the first frame's header at the highest bit
/// rate. Table entries are byte spans of `plan.frames_per_entry` output
/// frames, measured from the index frame. Nothing is written unless the
/// whole index could be built.
pub fn write_indexed<W: Write>(
    data: &[u8],
    scan: &ScanResult,
    plan: &TablePlan,
    options: &IndexOptions,
    mut out: W,
) -> Result<WriteSummary> {
    let frame_header = scan.first_header.at_max_bitrate();
    let frame_size = frame_header.frame_size() as usize;
    let delay_frames = plan.delay_frames.max(1) as usize;
    let inserted = frame_size * delay_frames;
    let first_offset = scan.first_frame_offset;

    let need = INDEX_PREFIX + plan.table_size as usize * ENTRY_WIDTH as usize;
    if need > frame_size {
        return Err(Error::IndexOverflow {
            need,
            have: frame_size,
        });
    }

    let entry_count = u16::try_from(plan.table_size).map_err(|_| {
        Error::invalid_index(
            first_offset as u64,
            format!("{} entries do not fit a 16-bit count", plan.table_size),
        )
    })?;
    let frames_per_entry = u16::try_from(plan.frames_per_entry).map_err(|_| {
        Error::invalid_index(
            first_offset as u64,
            format!(
                "{} frames per entry do not fit a 16-bit field",
                plan.frames_per_entry
            ),
        )
    })?;

    // Start of every output frame, relative to the index frame
    let mut starts: Vec<u64> = (0..delay_frames)
        .map(|k| (k * frame_size) as u64)
        .collect();
    starts.extend(Frames::starting_at(data, first_offset).filter_map(|event| match event {
        FrameEvent::Header(frame) => Some((inserted + frame.offset - first_offset) as u64),
        _ => None,
    }));
    let total_bytes = (inserted + data.len() - first_offset) as u64;

    let planned = plan.table_size as u64 * plan.frames_per_entry as u64;
    if starts.len() as u64 != planned {
        return Err(Error::FrameCountMismatch {
            planned,
            actual: starts.len() as u64,
        });
    }

    let per_entry = plan.frames_per_entry as usize;
    let spans: Vec<u64> = (0..plan.table_size as usize)
        .map(|g| {
            let start = starts[g * per_entry];
            let end = starts
                .get((g + 1) * per_entry)
                .copied()
                .unwrap_or(total_bytes);
            end - start
        })
        .collect();

    let largest = spans.iter().copied().max().unwrap_or(0);
    let scale_factor = u16::try_from(largest.div_ceil(u16::MAX as u64).max(1)).map_err(|_| {
        Error::invalid_index(first_offset as u64, format!("entry span {} too large", largest))
    })?;

    let header = VbriHeader {
        version: VBRI_VERSION,
        delay: u16::try_from(delay_frames as u64 * scan.samples_per_frame() as u64)
            .unwrap_or(u16::MAX),
        quality: options.quality,
        total_bytes: u32::try_from(total_bytes).unwrap_or(u32::MAX),
        total_frames: plan.output_frames,
        entry_count,
        scale_factor,
        entry_width: ENTRY_WIDTH,
        frames_per_entry,
    };

    let mut buf = BytesMut::with_capacity(inserted);
    write_index_frame(&mut buf, &frame_header, &header, &spans, frame_size);
    for _ in 1..delay_frames {
        write_silent_frame(&mut buf, &frame_header, frame_size);
    }

    out.write_all(&data[..first_offset])?;
    out.write_all(&buf)?;
    out.write_all(&data[first_offset..])?;
    out.flush()?;

    tracing::debug!(
        "Wrote VBRI index: {} entries x {} frames, scale {}, {} delay frames",
        header.entry_count,
        header.frames_per_entry,
        header.scale_factor,
        delay_frames
    );

    Ok(WriteSummary {
        bytes_written: (data.len() + inserted) as u64,
        index_offset: first_offset as u64,
        index_frame_size: frame_size as u32,
        header,
    })
}

fn write_index_frame(
    buf: &mut BytesMut,
    frame_header: &FrameHeader,
    header: &VbriHeader,
    spans: &[u64],
    frame_size: usize,
) {
    let start = buf.len();
    buf.put_slice(&frame_header.encode());
    buf.put_bytes(0, CHUNK_OFFSET);

    buf.put_slice(MAGIC);
    buf.put_u16(header.version);
    buf.put_u16(header.delay);
    buf.put_u16(header.quality);
    buf.put_u32(header.total_bytes);
    buf.put_u32(header.total_frames);
    buf.put_u16(header.entry_count);
    buf.put_u16(header.scale_factor);
    buf.put_u16(header.entry_width);
    buf.put_u16(header.frames_per_entry);

    let scale = header.scale_factor as u64;
    for &span in spans {
        let scaled = (span + scale / 2) / scale;
        buf.put_u16(scaled.min(u16::MAX as u64) as u16);
    }

    let written = buf.len() - start;
    buf.put_bytes(0, frame_size - written);
}

fn write_silent_frame(buf: &mut BytesMut, frame_header: &FrameHeader, frame_size: usize) {
    buf.put_slice(&frame_header.encode());
    buf.put_bytes(0, frame_size - FRAME_HEADER_SIZE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use crate::sizing::{plan_table, SizingParams};
    use crate::vbri::SeekIndex;

    fn stream(headers: &[[u8; 4]]) -> Vec<u8> {
        let mut data = Vec::new();
        for &bytes in headers {
            let size = FrameHeader::decode(bytes).unwrap().frame_size() as usize;
            let start = data.len();
            data.resize(start + size, 0);
            data[start..start + 4].copy_from_slice(&bytes);
        }
        data
    }

    fn index(data: &[u8]) -> (ScanResult, TablePlan, Vec<u8>, WriteSummary) {
        let result = scan(data).unwrap();
        let plan = plan_table(
            result.frame_count,
            result.file_size,
            result.max_frame_size(),
            &SizingParams::default().fitting_index_frame(result.max_frame_size()),
        )
        .unwrap();
        let mut out = Vec::new();
        let summary = write_indexed(data, &result, &plan, &IndexOptions::default(), &mut out).unwrap();
        (result, plan, out, summary)
    }

    #[test]
    fn test_write_small_stream_one_frame_per_entry() {
        let data = stream(&[[0xFF, 0xFB, 0x90, 0x00]; 20]);
        let (_, plan, out, summary) = index(&data);

        assert_eq!(plan.table_size, 21);
        assert_eq!(summary.index_frame_size, 1045);
        assert_eq!(out.len(), data.len() + 1045);
        assert_eq!(&out[1045..], &data[..]);

        let index = SeekIndex::locate(&out).unwrap().expect("index");
        let header = index.header();
        assert_eq!(header.entry_count, 21);
        assert_eq!(header.frames_per_entry, 1);
        assert_eq!(header.total_frames, 21);
        assert_eq!(header.total_bytes as usize, out.len());
        assert_eq!(header.delay, 1152);
        assert_eq!(header.quality, 75);

        let mut expected = vec![1045u32];
        expected.extend(std::iter::repeat(417).take(20));
        assert_eq!(index.entries(), &expected[..]);
    }

    #[test]
    fn test_write_grouped_entries_cover_stream() {
        let mut headers = Vec::new();
        for i in 0..1000 {
            headers.push(if i % 3 == 0 {
                [0xFF, 0xFB, 0xE0, 0x00]
            } else {
                [0xFF, 0xFB, 0x90, 0x00]
            });
        }
        let data = stream(&headers);
        let (result, plan, out, summary) = index(&data);

        assert!(plan.frames_per_entry > 1);
        assert_eq!(result.frame_count + plan.delay_frames, plan.output_frames);
        let inserted = plan.delay_frames as usize * summary.index_frame_size as usize;
        assert_eq!(out.len(), data.len() + inserted);

        let index = SeekIndex::locate(&out).unwrap().unwrap();
        let sum: u64 = index.entries().iter().map(|&e| e as u64).sum();
        assert_eq!(sum, out.len() as u64);
        assert_eq!(index.header().scale_factor, 1);
    }

    #[test]
    fn test_write_keeps_leading_bytes() {
        let mut data = b"junk".to_vec();
        data.extend(stream(&[[0xFF, 0xFB, 0x90, 0x00]; 5]));
        let (_, _, out, summary) = index(&data);

        assert_eq!(&out[..4], b"junk");
        assert_eq!(summary.index_offset, 4);
        let index = SeekIndex::locate(&out).unwrap().unwrap();
        assert_eq!(index.base_offset(), 4);
        assert_eq!(index.entries()[0], 1045);
    }

    #[test]
    fn test_write_rejects_mismatched_plan() {
        let data = stream(&[[0xFF, 0xFB, 0x90, 0x00]; 5]);
        let result = scan(&data).unwrap();
        let plan = plan_table(7, result.file_size, result.max_frame_size(), &SizingParams::default())
            .unwrap();

        let mut out = Vec::new();
        let err = write_indexed(&data, &result, &plan, &IndexOptions::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::FrameCountMismatch { planned: 8, actual: 6 }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_writable_table_size() {
        assert_eq!(writable_table_size(1045), 491);
        assert_eq!(writable_table_size(523), 230);
        assert_eq!(writable_table_size(62), 0);
        assert_eq!(writable_table_size(10), 0);
    }

    #[test]
    fn test_write_at_table_ceiling() {
        // 490 frames take one entry each plus the index frame: 491 entries
        let data = stream(&[[0xFF, 0xFB, 0x90, 0x00]; 490]);
        let (_, plan, out, summary) = index(&data);

        assert_eq!(plan.table_size, plan.max_table_size);
        assert_eq!(plan.table_size, 491);
        assert_eq!(summary.header.entry_count, 491);

        let index = SeekIndex::locate(&out).unwrap().unwrap();
        assert_eq!(index.entries().len(), 491);
        assert_eq!(index.entries()[0], 1045);
        assert_eq!(index.entries()[490], 417);
    }

    #[test]
    fn test_write_around_table_ceiling() {
        for frames in (485..=500).chain(985..=990) {
            let data = stream(&vec![[0xFF, 0xFB, 0x90, 0x00]; frames]);
            let (result, plan, out, summary) = index(&data);
            assert!(plan.table_size <= writable_table_size(result.max_frame_size()));
            assert_eq!(out.len() as u64, summary.bytes_written, "frames {}", frames);
        }
    }

    #[test]
    fn test_write_rejects_oversized_frames_per_entry() {
        let data = stream(&[[0xFF, 0xFB, 0x90, 0x00]; 5]);
        let result = scan(&data).unwrap();
        let plan = TablePlan {
            min_table_size: 0,
            max_table_size: 491,
            table_size: 1,
            frames_per_entry: 70_000,
            delay_frames: 1,
            output_frames: 70_000,
        };

        let mut out = Vec::new();
        let err = write_indexed(&data, &result, &plan, &IndexOptions::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_rejects_table_that_overflows_frame() {
        let data = stream(&[[0xFF, 0xFB, 0x90, 0x00]; 5]);
        let result = scan(&data).unwrap();
        let plan = TablePlan {
            min_table_size: 0,
            max_table_size: 600,
            table_size: 600,
            frames_per_entry: 1,
            delay_frames: 1,
            output_frames: 600,
        };

        let mut out = Vec::new();
        let err = write_indexed(&data, &result, &plan, &IndexOptions::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::IndexOverflow { have: 1045, .. }));
        assert!(out.is_empty());
    }
}
