//! Extract mode: NT hashes of the accounts admitted by the filter, one per
//! line, in input order.
use std::io::{self, Write};

use anyhow::{Context, Result};
use log::debug;

use crate::dit::parse_dit_line;
use crate::entry::{AccountFilter, ScanStats};

pub fn extract_hashes<I, W>(lines: I, filter: AccountFilter, out: &mut W) -> Result<ScanStats>
where
    I: IntoIterator<Item = io::Result<String>>,
    W: Write + ?Sized,
{
    let mut stats = ScanStats::default();
    for line in lines {
        let line = line.context("read account file")?;
        stats.lines += 1;
        let entry = match parse_dit_line(&line) {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping line {}: {}", stats.lines, e);
                stats.malformed += 1;
                continue;
            }
        };
        if !filter.admits(&entry) {
            stats.filtered += 1;
            continue;
        }
        writeln!(out, "{}", entry.nt_hash).context("write hash")?;
        stats.emitted += 1;
    }
    Ok(stats)
}
