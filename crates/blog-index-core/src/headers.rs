//! Header block parsing.
//!
//! A content file may start with an HTML comment holding `key: value`
//! lines:
//!
//! ```text
//! <!--
//! title: Ownership in practice
//! published: 2024-03-01
//! -->
//! # Body starts here
//! ```
//!
//! Only the leading comment is considered. A file whose first line does not
//! open a comment has no headers at all.

use std::collections::BTreeMap;
use std::io::{self, BufRead};

/// Marker the first line must contain to open a header block.
pub const HEADER_OPEN: &str = "<!--";
/// Marker that closes a header block.
pub const HEADER_CLOSE: &str = "-->";

/// Raw header key/value pairs as written in the file.
pub type Headers = BTreeMap<String, String>;

/// Result of scanning the top of a file for headers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    pub headers: Headers,
    /// Lines inside the block that are not `key: value` pairs, in file order.
    pub malformed: Vec<String>,
}

/// Scan `reader` for a leading header block.
///
/// Stops at the first line when it is not an opening marker, and at the
/// closing marker otherwise; the rest of the input is never read. Each line
/// in between is split on its first colon and both halves are trimmed.
pub fn parse_headers<R: BufRead>(reader: R) -> io::Result<HeaderBlock> {
    let mut block = HeaderBlock::default();
    let mut lines = reader.lines();

    match lines.next() {
        Some(first) => {
            if !first?.contains(HEADER_OPEN) {
                return Ok(block);
            }
        }
        None => return Ok(block),
    }

    for line in lines {
        let line = line?;
        if line.contains(HEADER_CLOSE) {
            break;
        }
        match split_header_line(&line) {
            Some((key, value)) => {
                block.headers.insert(key.to_string(), value.to_string());
            }
            None => block.malformed.push(line),
        }
    }

    Ok(block)
}

/// Parse headers out of an in-memory string.
pub fn parse_header_text(text: &str) -> HeaderBlock {
    // Reading from a byte slice of valid UTF-8 cannot fail.
    parse_headers(text.as_bytes()).unwrap_or_default()
}

/// Return the content that follows the header block, or the whole text when
/// it has none.
pub fn body_of(text: &str) -> &str {
    let Some(first_end) = text.find('\n') else {
        return if text.contains(HEADER_OPEN) { "" } else { text };
    };
    if !text[..first_end].contains(HEADER_OPEN) {
        return text;
    }

    let mut offset = first_end + 1;
    while offset < text.len() {
        let end = text[offset..]
            .find('\n')
            .map(|i| offset + i + 1)
            .unwrap_or(text.len());
        if text[offset..end].contains(HEADER_CLOSE) {
            return &text[end..];
        }
        offset = end;
    }
    ""
}

fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
