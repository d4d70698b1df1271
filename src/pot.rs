use std::collections::HashMap;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::io::{clean_line, iter_lines_auto};

/// Lowercased hash -> cleartext.
pub type PotLookup = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum PotError {
	#[error("malformed pot line: {0}")]
	MalformedLine(String),
}

pub fn parse_pot_line(line: &str) -> Result<(String, String), PotError> {
	// hash:password, only first ':' splits; allow empty password
	if let Some((hash, password)) = line.split_once(':') {
		Ok((hash.to_lowercase(), password.to_string()))
	} else {
		Err(PotError::MalformedLine(line.to_string()))
	}
}

/// Build a lookup from potfile lines. Later lines win on duplicate hashes.
pub fn collect_pot_lines<I>(lines: I) -> io::Result<PotLookup>
where
	I: IntoIterator<Item = io::Result<String>>,
{
	let mut map = PotLookup::new();
	for line in lines {
		let line = clean_line(&line?);
		if line.is_empty() {
			continue;
		}
		match parse_pot_line(&line) {
			Ok((h, p)) => {
				map.insert(h, p);
			}
			Err(e) => debug!("{}", e),
		}
	}
	Ok(map)
}

pub fn parse_pot_contents(contents: &str) -> PotLookup {
	// In-memory lines cannot fail to read.
	collect_pot_lines(contents.lines().map(|l| Ok(l.to_string()))).unwrap_or_default()
}

pub fn load_potfile<P: AsRef<Path>>(path: P, mmap_threshold_bytes: u64) -> Result<PotLookup> {
	let path = path.as_ref();
	let lines = iter_lines_auto(path, mmap_threshold_bytes)?;
	collect_pot_lines(lines).with_context(|| format!("read potfile {}", path.display()))
}
