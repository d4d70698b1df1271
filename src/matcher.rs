//! Match mode: join account entries against a potfile lookup and emit
//! `username:hash:password:status` lines (`username:hash::status` when the
//! hash is not cracked).
use std::io::{self, Write};

use anyhow::{Context, Result};
use log::debug;

use crate::dit::parse_dit_line;
use crate::entry::{AccountEntry, AccountFilter, ScanStats};
use crate::pot::PotLookup;

/// Cleartext for the entry's NT hash, if the potfile has a non-empty one.
pub fn lookup_password<'a>(pot: &'a PotLookup, entry: &AccountEntry) -> Option<&'a str> {
    pot.get(&entry.nt_hash.to_lowercase())
        .map(String::as_str)
        .filter(|p| !p.is_empty())
}

pub fn format_match_line(entry: &AccountEntry, password: Option<&str>) -> String {
    format!(
        "{}:{}:{}:{}",
        entry.username,
        entry.nt_hash,
        password.unwrap_or(""),
        entry.status()
    )
}

pub fn match_accounts<I, W>(
    lines: I,
    pot: &PotLookup,
    filter: AccountFilter,
    out: &mut W,
) -> Result<ScanStats>
where
    I: IntoIterator<Item = io::Result<String>>,
    W: Write + ?Sized,
{
    let mut stats = ScanStats::default();
    let mut cracked = 0usize;
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
        let password = lookup_password(pot, &entry);
        if password.is_some() {
            cracked += 1;
        }
        writeln!(out, "{}", format_match_line(&entry, password)).context("write match")?;
        stats.emitted += 1;
    }
    debug!("{} of {} emitted accounts cracked", cracked, stats.emitted);
    Ok(stats)
}
