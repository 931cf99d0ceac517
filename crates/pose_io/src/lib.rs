//! # Pose IO
//!
//! 时间戳位姿 CSV 文件读写。
//!
//! Record layout: `timestamp, x, y, z, qx, qy, qz, qw`, no header. Fields may
//! be wrapped in `|` quotes and padded with whitespace; blank lines and lines
//! starting with `#` are skipped. Output is written with 18 fractional digits.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use contracts::{AlignError, PoseRecord, PoseSequence};
use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{debug, instrument};

const QUOTE: u8 = b'|';
const COMMENT: u8 = b'#';

/// Read a pose sequence from a CSV file
///
/// # Errors
/// `Io` when the file cannot be opened; `MalformedInput` for a bad line or a
/// sequence that violates the ordering preconditions.
#[instrument(name = "pose_io_read", skip_all, fields(path = %path.display()))]
pub fn read_poses(path: &Path) -> Result<PoseSequence, AlignError> {
    let file = File::open(path)?;
    let poses = read_poses_from(BufReader::new(file))
        .map_err(|e| with_path(e, path))?;
    debug!(poses = poses.len(), "poses loaded");
    Ok(poses)
}

/// Read a pose sequence from any reader
pub fn read_poses_from<R: Read>(reader: R) -> Result<PoseSequence, AlignError> {
    let records = read_records(reader)?;
    if records.is_empty() {
        return Err(AlignError::malformed("no pose records found"));
    }
    PoseSequence::from_records(&records)
}

/// Parse raw records without sequence validation
pub fn read_records<R: Read>(reader: R) -> Result<Vec<PoseRecord>, AlignError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote(QUOTE)
        .comment(Some(COMMENT))
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        let record = parse_record(&row).map_err(|message| match row.position() {
            Some(pos) => AlignError::malformed(format!("line {}: {message}", pos.line())),
            None => AlignError::malformed(message),
        })?;
        records.push(record);
    }

    Ok(records)
}

fn parse_record(row: &StringRecord) -> Result<PoseRecord, String> {
    if row.len() != PoseRecord::FIELD_COUNT {
        return Err(format!(
            "expected {} fields per pose record, got {}",
            PoseRecord::FIELD_COUNT,
            row.len()
        ));
    }
    row.deserialize::<PoseRecord>(None).map_err(|e| match e.kind() {
        ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(field) => format!(
                "cannot parse '{}' as a number: {}",
                row.get(field as usize).unwrap_or_default(),
                err.kind()
            ),
            None => err.to_string(),
        },
        _ => e.to_string(),
    })
}

/// Write a pose sequence to a CSV file, replacing any existing file
#[instrument(name = "pose_io_write", skip_all, fields(path = %path.display(), poses = poses.len()))]
pub fn write_poses(path: &Path, poses: &PoseSequence) -> Result<(), AlignError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_poses_to(&mut writer, poses)?;
    writer.flush()?;
    Ok(())
}

/// Write a pose sequence to any writer
pub fn write_poses_to<W: Write>(writer: &mut W, poses: &PoseSequence) -> Result<(), AlignError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote(QUOTE)
        .from_writer(writer);
    for record in poses.to_records() {
        writer
            .write_record(record.to_fields().iter().map(|v| format!("{v:.18}")))
            .map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_error(err: csv::Error) -> AlignError {
    if err.is_io_error() {
        return AlignError::Io(err.into());
    }
    let line = err.position().map(|pos| pos.line());
    match line {
        Some(line) => AlignError::malformed(format!("line {line}: {err}")),
        None => AlignError::malformed(err.to_string()),
    }
}

fn with_path(err: AlignError, path: &Path) -> AlignError {
    match err {
        AlignError::MalformedInput { message } => {
            AlignError::malformed(format!("{}: {message}", path.display()))
        }
        other => other,
    }
}
