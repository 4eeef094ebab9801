//! Parser for ripgrep's `--json` output.
//!
//! Each stdout line is one record `{"type": ..., "data": {...}}`. Only
//! `match` records are decoded; `begin`, `end`, `context` and `summary`
//! records, and anything that is not valid JSON, are skipped.

use serde::Deserialize;

use super::{RawMatch, trim_line_ending};

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct MatchData {
    path: Text,
    lines: Text,
    line_number: Option<u64>,
}

/// ripgrep encodes UTF-8 as `{"text": ..}` and anything else as
/// `{"bytes": <base64>}`; only the former is usable here.
#[derive(Deserialize)]
struct Text {
    #[serde(default)]
    text: Option<String>,
}

/// Decode one JSON line into a match, or `None` if it is not a usable match
/// record.
#[must_use]
pub fn parse_record(line: &str) -> Option<RawMatch> {
    let record: Record = serde_json::from_str(line).ok()?;
    if record.kind != "match" {
        return None;
    }

    let data: MatchData = serde_json::from_value(record.data).ok()?;
    let line_number = usize::try_from(data.line_number?).ok().filter(|n| *n > 0)?;

    Some(RawMatch {
        path: data.path.text?,
        line_number,
        text: trim_line_ending(&data.lines.text?).to_string(),
    })
}
