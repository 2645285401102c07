//! Lenient JSON record codec. Input files are either a JSON array of objects
//! or newline-delimited JSON; a record that fails to decode is skipped and
//! reported instead of failing the whole file.

use crate::error::{AdviserError, AdviserResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A record that was dropped while decoding an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Element index for array documents, 1-based line number for NDJSON.
    pub index: usize,
    pub reason: String,
}

/// Successfully decoded records plus diagnostics for the ones that were not.
#[derive(Debug, Clone)]
pub struct ParsedRecords<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> ParsedRecords<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, index: usize, reason: String) {
        warn!(index, reason = %reason, "Ignoring malformed record");
        self.skipped.push(SkippedRecord { index, reason });
    }
}

/// Read and decode every record in `path`.
pub fn read_records<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> AdviserResult<ParsedRecords<T>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| AdviserError::io(path, e))?;
    let parsed = parse_records(&content).map_err(|message| AdviserError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    metrics::counter!("adviser.records.parsed").increment(parsed.records.len() as u64);
    metrics::counter!("adviser.records.skipped").increment(parsed.skipped.len() as u64);
    debug!(
        path = %path.display(),
        records = parsed.records.len(),
        skipped = parsed.skipped.len(),
        "Input file decoded"
    );

    Ok(parsed)
}

/// Decode records from an in-memory document. Only a syntactically broken
/// array document is an error; everything else is per-record.
pub fn parse_records<T: DeserializeOwned>(content: &str) -> Result<ParsedRecords<T>, String> {
    let content = content.trim_start_matches('\u{feff}');
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(ParsedRecords::new());
    }
    if trimmed.starts_with('[') {
        parse_array(trimmed)
    } else {
        Ok(parse_lines(content))
    }
}

fn parse_array<T: DeserializeOwned>(content: &str) -> Result<ParsedRecords<T>, String> {
    let elements: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(|e| e.to_string())?;

    let mut parsed = ParsedRecords::new();
    parsed.records.reserve(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(record) => parsed.records.push(record),
            Err(e) => parsed.skip(index, e.to_string()),
        }
    }
    Ok(parsed)
}

fn parse_lines<T: DeserializeOwned>(content: &str) -> ParsedRecords<T> {
    let mut parsed = ParsedRecords::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => parsed.records.push(record),
            Err(e) => parsed.skip(idx + 1, e.to_string()),
        }
    }
    parsed
}

/// Write `records` to `path` as a JSON array, creating parent directories.
pub fn write_records<T: Serialize>(
    path: impl AsRef<Path>,
    records: &[T],
    pretty: bool,
) -> AdviserResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AdviserError::io(parent, e))?;
    }

    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    fs::write(path, json).map_err(|e| AdviserError::io(path, e))?;

    debug!(path = %path.display(), count = records.len(), "Records written");
    Ok(())
}
