//! Loading scraped catch records from disk.
//!
//! The scraper writes either one JSON array or JSON lines; both are accepted.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::error::{CatchLogError, Result};
use crate::CatchRecord;

pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<CatchRecord>> {
    let path = path.as_ref();
    let records = parse_records(BufReader::new(File::open(path)?))?;
    info!(path = %path.display(), count = records.len(), "read scraped records");
    Ok(records)
}

/// Parse a JSON array or JSON-lines stream. Blank lines are skipped.
pub fn parse_records(mut reader: impl BufRead) -> Result<Vec<CatchRecord>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    if text.trim_start().starts_with('[') {
        return serde_json::from_str(&text).map_err(|e| CatchLogError::Import {
            line: e.line(),
            message: e.to_string(),
        });
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<CatchRecord>(line).map_err(|e| CatchLogError::Import {
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}
