//! File-level operations behind the `add` and `seek` commands.

use anyhow::{Context, Result};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use vbrindex_mpeg::{
    first_frame, plan_table, scan, write_indexed, ScanResult, SeekIndex, SeekPoint, TablePlan,
    WriteSummary,
};

use crate::config::Config;

/// Outcome of indexing one file.
#[derive(Debug)]
pub struct AddReport {
    pub output: PathBuf,
    pub scan: ScanResult,
    pub plan: TablePlan,
    /// `None` on a dry run.
    pub summary: Option<WriteSummary>,
}

/// `<dir>/<stem><suffix>.<ext>` next to the input.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}{}", stem, suffix);
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    input.with_file_name(name)
}

/// Scan `input`, size a seek table for it and write the indexed copy to
/// `output` (or the default output path).
pub fn add_index(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    dry_run: bool,
) -> Result<AddReport> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input, &config.index.output_suffix));

    if same_file(input, &output) {
        anyhow::bail!("Output would overwrite the input file: {:?}", input);
    }

    let data = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let result = scan(&data).with_context(|| format!("Failed to scan {:?}", input))?;
    tracing::info!(
        "Scanned {:?}: {} frames, {:.2}s",
        input,
        result.frame_count,
        result.duration_secs
    );

    if SeekIndex::locate(&data)?.is_some() {
        anyhow::bail!("{:?} already carries a VBRI index", input);
    }

    let max_frame_size = result.max_frame_size();
    let plan = plan_table(
        result.frame_count,
        result.file_size,
        max_frame_size,
        &config.sizing.params().fitting_index_frame(max_frame_size),
    )
    .with_context(|| format!("Failed to size a seek table for {:?}", input))?;
    tracing::debug!("Table plan: {:?}", plan);

    if dry_run {
        return Ok(AddReport {
            output,
            scan: result,
            plan,
            summary: None,
        });
    }

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;

    let summary = {
        let mut writer = std::io::BufWriter::new(tmp.as_file_mut());
        let summary = write_indexed(&data, &result, &plan, &config.index.options(), &mut writer)?;
        writer.flush()?;
        summary
    };

    tmp.persist(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;
    tracing::info!("Wrote {} bytes to {:?}", summary.bytes_written, output);

    Ok(AddReport {
        output,
        scan: result,
        plan,
        summary: Some(summary),
    })
}

/// Closest indexed position at or before `seconds`, or `None` when the file
/// carries no index.
pub fn seek(path: &Path, seconds: f64) -> Result<Option<(SeekIndex, SeekPoint)>> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;

    let frame = {
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        first_frame(&data).with_context(|| format!("No MPEG audio in {:?}", path))?
    };

    file.seek(SeekFrom::Start(frame.offset as u64))?;
    let Some(index) = SeekIndex::read_from(&mut file, &frame.header)? else {
        return Ok(None);
    };
    let point = index.closest_offset_before(seconds);
    Ok(Some((index, point)))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MP3_128K: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];

    fn write_mp3(path: &Path, frames: usize) {
        let mut data = Vec::new();
        for _ in 0..frames {
            data.extend_from_slice(&MP3_128K);
            data.resize(data.len() + 413, 0x11);
        }
        std::fs::write(path, data).unwrap();
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/music/song.mp3"), "-out"),
            PathBuf::from("/music/song-out.mp3")
        );
        assert_eq!(
            default_output_path(Path::new("track"), "-vbri"),
            PathBuf::from("track-vbri")
        );
    }

    #[test]
    fn test_add_index_writes_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.mp3");
        write_mp3(&input, 200);

        let report = add_index(&input, None, &Config::default(), false).unwrap();
        assert_eq!(report.output, dir.path().join("song-out.mp3"));
        assert!(report.output.exists());

        let summary = report.summary.unwrap();
        let written = std::fs::metadata(&report.output).unwrap().len();
        assert_eq!(written, summary.bytes_written);

        let (index, point) = seek(&report.output, 0.0).unwrap().unwrap();
        assert_eq!(index.header().total_frames, report.plan.output_frames);
        assert_eq!(point.offset, 0);
    }

    #[test]
    fn test_add_index_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.mp3");
        write_mp3(&input, 50);

        let report = add_index(&input, None, &Config::default(), true).unwrap();
        assert!(report.summary.is_none());
        assert!(!report.output.exists());
        assert_eq!(report.scan.frame_count, 50);
    }

    #[test]
    fn test_add_index_refuses_to_overwrite_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.mp3");
        write_mp3(&input, 10);

        let err = add_index(&input, Some(&input), &Config::default(), false).unwrap_err();
        assert!(err.to_string().contains("overwrite"));
    }

    #[test]
    fn test_add_index_at_frame_capacity() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.mp3");

        for frames in [490, 491, 492, 493] {
            write_mp3(&input, frames);
            let report = add_index(&input, None, &Config::default(), false).unwrap();
            assert!(report.plan.table_size <= 491);
            assert!(seek(&report.output, 0.0).unwrap().is_some());
        }
    }

    #[test]
    fn test_add_index_refuses_indexed_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.mp3");
        write_mp3(&input, 30);

        let report = add_index(&input, None, &Config::default(), false).unwrap();
        let again = dir.path().join("again.mp3");
        let err = add_index(&report.output, Some(&again), &Config::default(), false).unwrap_err();
        assert!(err.to_string().contains("already carries a VBRI index"));
        assert!(!again.exists());
    }

    #[test]
    fn test_seek_without_index() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.mp3");
        write_mp3(&input, 10);
        assert!(seek(&input, 1.0).unwrap().is_none());
    }
}
