//! JSON in, JSON lines out.
//!
//! Input logs are a JSON array of `{role, content, timestamp}` objects.
//! Records are first decoded loosely so a missing field, unknown role or bad
//! timestamp can be reported with the index of the offending record, then
//! validated into [`Message`]s. Any invalid record rejects the whole log.
//!
//! Output is one `{"messages": [...]}` object per line.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::error::SegmentError;
use crate::model::message::{Message, Role};
use crate::model::transcript::Transcript;

/// Timestamp layouts carrying an explicit UTC offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Offset-less layouts; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A record as it appears on disk, before validation.
#[derive(Debug, Deserialize)]
struct RawMessage {
    role: Option<String>,
    content: Option<String>,
    timestamp: Option<String>,
}

impl RawMessage {
    fn validate(self, index: usize) -> Result<Message, SegmentError> {
        let role = self.role.ok_or(SegmentError::MissingField {
            index,
            field: "role",
        })?;
        let content = self.content.ok_or(SegmentError::MissingField {
            index,
            field: "content",
        })?;
        let timestamp = self.timestamp.ok_or(SegmentError::MissingField {
            index,
            field: "timestamp",
        })?;

        let role = Role::parse(&role).ok_or(SegmentError::UnknownRole { index, role })?;
        let timestamp = parse_timestamp(&timestamp).ok_or(SegmentError::InvalidTimestamp {
            index,
            value: timestamp,
        })?;

        Ok(Message {
            role,
            content,
            timestamp,
        })
    }
}

/// Parse an ISO-8601 timestamp into a UTC instant.
///
/// Accepts RFC 3339 and offset-bearing date-times (normalized to UTC),
/// naive date-times with a `T` or space separator (taken as UTC), and bare
/// dates (midnight UTC). Fractional seconds are optional.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Decode and validate a JSON message log held in memory.
pub fn decode_messages(json: &str) -> Result<Vec<Message>, SegmentError> {
    let raw: Vec<RawMessage> = serde_json::from_str(json)?;
    validate_all(raw)
}

/// Decode and validate a JSON message log from any reader.
pub fn decode_messages_from_reader<R: Read>(reader: R) -> Result<Vec<Message>, SegmentError> {
    let raw: Vec<RawMessage> = serde_json::from_reader(reader)?;
    validate_all(raw)
}

fn validate_all(raw: Vec<RawMessage>) -> Result<Vec<Message>, SegmentError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, r)| r.validate(i))
        .collect()
}

/// Load a message log from a JSON file.
pub fn load_messages_json(path: &Path) -> Result<Vec<Message>, SegmentError> {
    let file = File::open(path).map_err(|e| SegmentError::io(path, e))?;
    decode_messages_from_reader(BufReader::new(file))
}

/// Write transcripts as JSON lines, one object per transcript.
pub fn encode_transcripts_jsonl<W: Write>(
    mut out: W,
    transcripts: &[Transcript],
) -> std::io::Result<()> {
    for t in transcripts {
        serde_json::to_writer(&mut out, t)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Write `transcripts` to `path` as JSON lines, replacing any existing file.
///
/// The lines go to a temp file in the same directory, which is renamed over
/// `path` only once fully written. A failed write leaves `path` untouched.
pub fn write_transcripts_jsonl(
    path: &Path,
    transcripts: &[Transcript],
) -> Result<(), SegmentError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SegmentError::io(path, e))?;
    encode_transcripts_jsonl(BufWriter::new(tmp.as_file_mut()), transcripts)
        .map_err(|e| SegmentError::io(path, e))?;
    tmp.persist(path).map_err(|e| SegmentError::io(path, e.error))?;
    Ok(())
}
