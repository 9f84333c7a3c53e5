use std::path::Path;

use cue_sync_core::{CueSyncError, InboundMessage, Result};
use serde::Deserialize;

/// One recorded transport message and the time it arrived, in seconds since
/// the start of the recording.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub at: f64,
    pub message: InboundMessage,
}

#[derive(Deserialize)]
struct RawLine {
    at: f64,
    message: serde_json::Value,
}

pub fn parse_line(line: &str) -> Result<TraceEntry> {
    let raw: RawLine = serde_json::from_str(line)?;
    if !raw.at.is_finite() || raw.at < 0.0 {
        return Err(CueSyncError::msg(format!(
            "arrival time must be a non-negative number, got {}",
            raw.at
        )));
    }
    Ok(TraceEntry {
        at: raw.at,
        message: InboundMessage::from_value(raw.message)?,
    })
}

/// Parses a JSON-lines trace. Blank lines are skipped; arrival times must not
/// decrease.
pub fn parse_trace(text: &str) -> Result<Vec<TraceEntry>> {
    let mut entries: Vec<TraceEntry> = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_line(line)
            .map_err(|err| CueSyncError::msg(format!("line {}: {err}", index + 1)))?;
        if let Some(previous) = entries.last() {
            if entry.at < previous.at {
                return Err(CueSyncError::msg(format!(
                    "line {}: arrival time {} is earlier than {}",
                    index + 1,
                    entry.at,
                    previous.at
                )));
            }
        }
        entries.push(entry);
    }
    Ok(entries)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceEntry>> {
    let text = std::fs::read_to_string(path)?;
    parse_trace(&text)
}
