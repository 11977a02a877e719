//! CoNLL-U text parsing
//!
//! Parsing happens in two passes over an assembled corpus buffer:
//!
//! 1. [`stamp_sent_ids`] appends the current `sent_id` as an eleventh
//!    column to every token line.
//! 2. [`parse_tokens`] decomposes each stamped line into a [`Token`].
//!
//! Lines that do not have the token shape (multiword ranges, empty nodes,
//! short or garbled lines) are skipped and counted rather than rejected.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::bytes::{bs_atoi, is_digits, split_fields};
use crate::tree::Token;
use thiserror::Error;
use tracing::debug;

/// Number of columns in a stamped token line (ten CoNLL-U columns + sent_id)
pub const STAMPED_FIELDS: usize = 11;

/// Fatal error during token parsing
#[derive(Debug, Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

/// Counters collected while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub tokens: usize,
    /// Data lines that did not have the token shape
    pub skipped: usize,
}

/// Extract the value of a `sent_id = <value>` comment line
fn parse_sent_id(line: &str) -> Option<&str> {
    let comment = line.strip_prefix('#')?;
    let (key, value) = comment.split_once('=')?;
    if key.trim() == "sent_id" {
        Some(value.trim())
    } else {
        None
    }
}

#[inline]
fn is_data_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

/// Append the most recent sentence identifier to every data line.
///
/// Comment lines and blank lines pass through unchanged. Data lines seen
/// before any `sent_id` declaration are stamped with an empty identifier.
/// Carriage returns at line ends are dropped.
pub fn stamp_sent_ids(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + text.len() / 8);
    let mut sent_id = "";

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            output.push('\n');
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(id) = parse_sent_id(line) {
            sent_id = id;
        }
        output.push_str(line);
        if is_data_line(line) {
            output.push('\t');
            output.push_str(sent_id);
        }
    }

    output
}

/// Parse every token line of a stamped buffer, in buffer order
pub fn parse_tokens(stamped: &str) -> Result<(Vec<Token>, ParseStats), ParseError> {
    let mut tokens = Vec::new();
    let mut stats = ParseStats::default();

    for (i, line) in stamped.split('\n').enumerate() {
        if !is_data_line(line) {
            continue;
        }
        match parse_line(line, i + 1)? {
            Some(token) => tokens.push(token),
            None => {
                debug!(line_num = i + 1, line, "skipping line without token shape");
                stats.skipped += 1;
            }
        }
    }

    stats.tokens = tokens.len();
    Ok((tokens, stats))
}

/// Parse a single stamped line.
///
/// Returns `Ok(None)` for lines that do not have the token shape, and an
/// error when the ID or HEAD column is empty or does not fit an integer.
fn parse_line(line: &str, line_num: usize) -> Result<Option<Token>, ParseError> {
    let Some(fields) = split_fields(line, STAMPED_FIELDS) else {
        return Ok(None);
    };

    // Multiword ranges (1-2), empty nodes (2.1) and `_` heads fall out here
    if !is_digits(fields[0].as_bytes()) || !is_digits(fields[6].as_bytes()) {
        return Ok(None);
    }

    let id = coerce(fields[0], "ID", line_num)?;
    let head = coerce(fields[6], "HEAD", line_num)?;

    Ok(Some(Token {
        id,
        form: fields[1].to_string(),
        lemma: fields[2].to_string(),
        upos: fields[3].to_string(),
        xpos: fields[4].to_string(),
        feats: split_multi(fields[5]),
        head,
        deprel: fields[7].to_string(),
        deps: split_multi(fields[8]),
        misc: fields[9].to_string(),
        sent_id: fields[10].to_string(),
        sentence: 0,
        offset: 0,
    }))
}

fn coerce(field: &str, column: &str, line_num: usize) -> Result<usize, ParseError> {
    bs_atoi(field.as_bytes()).ok_or_else(|| ParseError {
        line_num,
        message: format!("Invalid {}: {:?}", column, field),
    })
}

/// Split a `|`-separated column. The `_` placeholder is kept as a value.
fn split_multi(field: &str) -> Vec<String> {
    field.split('|').map(str::to_string).collect()
}
