//! Parser for matched files (`username:hash:password:status`), the output of
//! match mode and the input of analytics mode.
use std::path::Path;

use crate::entry::{CrackedEntry, Status, is_machine_name};
use crate::io::{clean_line, iter_lines_bufread};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MatchedLineError {
    #[error("empty line")]
    EmptyLine,
    #[error("malformed matched line: {0}")]
    MalformedLine(String),
}

pub fn parse_matched_line(line: &str) -> Result<CrackedEntry, MatchedLineError> {
    let line = clean_line(line);
    if line.is_empty() {
        return Err(MatchedLineError::EmptyLine);
    }
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() < 4 {
        return Err(MatchedLineError::MalformedLine(line.clone()));
    }
    let last = parts.len() - 1;
    // The password sits between hash and status and may itself hold colons.
    let password = if parts.len() == 4 {
        parts[2].to_string()
    } else {
        parts[2..last].join(":")
    };
    Ok(CrackedEntry {
        username: parts[0].to_string(),
        nt_hash: parts[1].to_string(),
        is_disabled: parts[last] == "Disabled",
        is_machine: is_machine_name(parts[0]),
        cracked: !password.is_empty(),
        password,
    })
}

/// True when the cleaned line has at least four fields and ends in an exact
/// `Enabled`/`Disabled` status.
pub fn looks_like_matched_line(line: &str) -> bool {
    let line = clean_line(line);
    let parts: Vec<&str> = line.split(':').collect();
    parts.len() >= 4 && parts.last().and_then(|s| Status::parse(s)).is_some()
}

/// Sniff whether `path` is a matched file by its first line. Any I/O failure
/// answers `false`, which sends the caller to extract mode.
pub fn is_matched_file<P: AsRef<Path>>(path: P) -> bool {
    let Ok(mut lines) = iter_lines_bufread(path) else {
        return false;
    };
    match lines.next() {
        Some(Ok(first)) => looks_like_matched_line(&first),
        _ => false,
    }
}
