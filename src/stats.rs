//! Aggregate statistics over matched entries.
//!
//! [`PasswordStats`] accumulates one scan of a matched file and
//! [`PasswordStats::finalize`] turns it into an [`AnalyticsSummary`] with
//! percentages, the length distribution and the most reused passwords.
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::io;

use anyhow::{Context, Result};
use log::debug;
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::entry::{AccountFilter, CrackedEntry, ScanStats};
use crate::matched::parse_matched_line;

/// Minimum length of a DOMAIN_PASSWORD_COMPLEX password.
pub const COMPLEX_MIN_LENGTH: usize = 8;
/// Character categories (of four) a complex password must draw from.
pub const COMPLEX_MIN_CATEGORIES: usize = 3;

/// Character classes of the complexity policy, by Unicode general category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Special,
}

fn char_class(c: char) -> Option<CharClass> {
    use GeneralCategory::*;
    match get_general_category(c) {
        UppercaseLetter => Some(CharClass::Upper),
        LowercaseLetter => Some(CharClass::Lower),
        DecimalNumber => Some(CharClass::Digit),
        ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation
        | InitialPunctuation | FinalPunctuation | OtherPunctuation | MathSymbol
        | CurrencySymbol | ModifierSymbol | OtherSymbol => Some(CharClass::Special),
        _ => None,
    }
}

/// At least eight characters drawn from three of: uppercase (Lu), lowercase
/// (Ll), decimal digits (Nd), punctuation/symbols (P*, S*).
pub fn is_complex(password: &str) -> bool {
    if password.chars().count() < COMPLEX_MIN_LENGTH {
        return false;
    }
    let mut seen: Vec<CharClass> = Vec::with_capacity(4);
    for class in password.chars().filter_map(char_class) {
        if !seen.contains(&class) {
            seen.push(class);
        }
    }
    seen.len() >= COMPLEX_MIN_CATEGORIES
}

fn pct(n: usize, d: usize) -> f64 {
    if d == 0 {
        return 0.0;
    }
    (n as f64) / (d as f64) * 100.0
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PasswordStats {
    pub total_accounts: usize,
    pub cracked_accounts: usize,
    pub complex_count: usize,
    /// Password length in characters -> occurrences.
    pub length_distribution: BTreeMap<usize, usize>,
    pub password_counts: HashMap<String, usize>,
}

impl PasswordStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one entry that already passed the account filter.
    pub fn record(&mut self, entry: &CrackedEntry) {
        self.total_accounts += 1;
        if !entry.cracked {
            return;
        }
        self.cracked_accounts += 1;
        *self
            .length_distribution
            .entry(entry.password.chars().count())
            .or_insert(0) += 1;
        *self
            .password_counts
            .entry(entry.password.clone())
            .or_insert(0) += 1;
        if is_complex(&entry.password) {
            self.complex_count += 1;
        }
    }

    pub fn finalize(self, top_n: usize) -> AnalyticsSummary {
        let top_passwords = top_passwords(&self.password_counts, top_n);
        AnalyticsSummary {
            crack_percentage: pct(self.cracked_accounts, self.total_accounts),
            complex_percentage: pct(self.complex_count, self.cracked_accounts),
            total_accounts: self.total_accounts,
            cracked_accounts: self.cracked_accounts,
            complex_count: self.complex_count,
            length_distribution: self.length_distribution.into_iter().collect(),
            top_passwords,
            top_limit: top_n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCount {
    pub password: String,
    pub count: usize,
}

/// Return the top-N most reused passwords sorted descending by count, then
/// ascending by password so ties render the same way on every run.
pub fn top_passwords(counts: &HashMap<String, usize>, top_n: usize) -> Vec<PasswordCount> {
    let mut items: Vec<PasswordCount> = counts
        .iter()
        .map(|(password, &count)| PasswordCount {
            password: password.clone(),
            count,
        })
        .collect();
    items.sort_by(|a, b| (Reverse(a.count), &a.password).cmp(&(Reverse(b.count), &b.password)));
    items.truncate(top_n);
    items
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub total_accounts: usize,
    pub cracked_accounts: usize,
    pub crack_percentage: f64,
    pub complex_count: usize,
    pub complex_percentage: f64,
    /// (length, count), ascending by length.
    pub length_distribution: Vec<(usize, usize)>,
    pub top_passwords: Vec<PasswordCount>,
    /// Size the top table was cut to.
    pub top_limit: usize,
}

impl AnalyticsSummary {
    pub fn uncracked_accounts(&self) -> usize {
        self.total_accounts - self.cracked_accounts
    }

    pub fn uncracked_percentage(&self) -> f64 {
        pct(self.uncracked_accounts(), self.total_accounts)
    }

    pub fn non_complex_count(&self) -> usize {
        self.cracked_accounts - self.complex_count
    }

    pub fn non_complex_percentage(&self) -> f64 {
        pct(self.non_complex_count(), self.cracked_accounts)
    }

    /// Share of cracked passwords with the given count.
    pub fn share_of_cracked(&self, count: usize) -> f64 {
        pct(count, self.cracked_accounts)
    }
}

/// Scan matched-file lines, keeping the entries the filter admits.
pub fn collect_stats<I>(lines: I, filter: AccountFilter) -> Result<(PasswordStats, ScanStats)>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut acc = PasswordStats::new();
    let mut scan = ScanStats::default();
    for line in lines {
        let line = line.context("read matched file")?;
        scan.lines += 1;
        let entry = match parse_matched_line(&line) {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping line {}: {}", scan.lines, e);
                scan.malformed += 1;
                continue;
            }
        };
        if !filter.admits(&entry) {
            scan.filtered += 1;
            continue;
        }
        acc.record(&entry);
        scan.emitted += 1;
    }
    Ok((acc, scan))
}
