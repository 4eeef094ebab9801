//! Parser for ripgrep's plain `path:line:content` output.

use super::{RawMatch, trim_line_ending};

/// Parse one `path:line:content` line.
///
/// The first two colons are delimiters; everything after the second belongs
/// to the content. Lines without that shape, or with a line number that is
/// not a positive integer, yield `None`.
#[must_use]
pub fn parse_line(line: &str) -> Option<RawMatch> {
    let mut parts = trim_line_ending(line).splitn(3, ':');
    let path = parts.next()?;
    let number = parts.next()?;
    let content = parts.next()?;

    if path.is_empty() || number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let line_number = number.parse::<usize>().ok().filter(|n| *n > 0)?;

    Some(RawMatch {
        path: path.to_string(),
        line_number,
        text: content.to_string(),
    })
}
