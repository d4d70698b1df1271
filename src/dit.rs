use crate::entry::{AccountEntry, is_machine_name};
use crate::io::clean_line;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DitError {
    #[error("empty line")]
    EmptyLine,
    #[error("malformed line (expected at least 4 colon-separated fields, got {fields}): {line}")]
    MalformedLine { fields: usize, line: String },
}

/// Disabled when the line carries `status=disabled`, or mentions "disabled"
/// anywhere without an explicit `status=enabled`. The second rule also fires
/// on usernames containing "disabled".
fn looks_disabled(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("status=disabled")
        || (lower.contains("disabled") && !lower.contains("status=enabled"))
}

pub fn parse_dit_line(line: &str) -> Result<AccountEntry, DitError> {
    // Expected: domain\user:rid:lm:nt::: (status=Enabled); fields after the 4th are ignored
    let line = clean_line(line);
    if line.is_empty() {
        return Err(DitError::EmptyLine);
    }
    let is_disabled = looks_disabled(&line);

    let mut body = line.as_str();
    if let Some(idx) = body.find("(status=") {
        body = body[..idx].trim_end();
    }
    let body = body.trim_end_matches(':');

    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() < 4 {
        return Err(DitError::MalformedLine {
            fields: parts.len(),
            line: line.clone(),
        });
    }

    Ok(AccountEntry {
        username: parts[0].to_string(),
        rid: parts[1].to_string(),
        lm_hash: parts[2].to_string(),
        nt_hash: parts[3].to_string(),
        is_disabled,
        is_machine: is_machine_name(parts[0]),
        raw_line: line.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LM: &str = "aad3b435b51404eeaad3b435b51404ee";

    fn parse_dit_contents(contents: &str) -> Vec<AccountEntry> {
        contents
            .lines()
            .filter_map(|line| parse_dit_line(line).ok())
            .collect()
    }

    #[test]
    fn parse_valid_line() {
        let line = format!("CORP\\bob:1105:{LM}:5835048ce94ad0564e29a924a03510ef::: (status=Enabled)");
        let e = parse_dit_line(&line).unwrap();
        assert_eq!(e.username, "CORP\\bob");
        assert_eq!(e.rid, "1105");
        assert_eq!(e.lm_hash, LM);
        assert_eq!(e.nt_hash, "5835048ce94ad0564e29a924a03510ef");
        assert!(!e.is_disabled);
        assert!(!e.is_machine);
        assert_eq!(e.raw_line, line);
    }

    #[test]
    fn line_without_annotation_is_enabled() {
        let e = parse_dit_line("CORP\\alice:500:lm:nt:::").unwrap();
        assert!(!e.is_disabled);
        assert_eq!(e.nt_hash, "nt");
    }

    #[test]
    fn disabled_annotation_is_detected_and_stripped() {
        let e = parse_dit_line("CORP\\old:1200:lm:nthash::: (status=Disabled)").unwrap();
        assert!(e.is_disabled);
        assert_eq!(e.nt_hash, "nthash");
        assert!(!e.nt_hash.contains("status"));
    }

    #[test]
    fn status_marker_is_case_insensitive() {
        let e = parse_dit_line("CORP\\old:1200:lm:nthash::: (STATUS=DISABLED)").unwrap();
        assert!(e.is_disabled);
        // "(status=" truncation is case-sensitive, so the annotation survives
        // as an ignored trailing field.
        assert_eq!(e.nt_hash, "nthash");
    }

    #[test]
    fn known_ambiguity_username_containing_disabled() {
        // The loose "disabled" heuristic marks this account disabled even
        // though no status annotation says so.
        let e = parse_dit_line("CORP\\disabledsvc:1300:lm:nt:::").unwrap();
        assert!(e.is_disabled);
        // An explicit enabled status overrides the heuristic.
        let e = parse_dit_line("CORP\\disabledsvc:1300:lm:nt::: (status=Enabled)").unwrap();
        assert!(!e.is_disabled);
    }

    #[test]
    fn machine_accounts_are_flagged() {
        let e = parse_dit_line("CORP\\WS01$:1001:lm:nt:::").unwrap();
        assert!(e.is_machine);
    }

    #[test]
    fn crlf_and_padding_are_cleaned() {
        let e = parse_dit_line("  CORP\\bob:1:lm:nt:::\r").unwrap();
        assert_eq!(e.username, "CORP\\bob");
        assert_eq!(e.raw_line, "CORP\\bob:1:lm:nt:::");
    }

    #[test]
    fn rejects_short_and_empty_lines() {
        assert_eq!(parse_dit_line("   "), Err(DitError::EmptyLine));
        match parse_dit_line("user:1:lm::: (status=Enabled)") {
            Err(DitError::MalformedLine { fields, .. }) => assert_eq!(fields, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn skip_malformed_lines_in_bulk() {
        let contents = "\nINVALID\nD\\A:1:x:y:z:extra\nD\\B:2:x:31d6cfe0d16ae931b73c59d7e0c089c0:::\n";
        let entries = parse_dit_contents(contents);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].nt_hash, "y");
        assert_eq!(entries[1].username, "D\\B");
    }
}
