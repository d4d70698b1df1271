//! Engine: picks the run mode from the options and drives one complete pass
//! over the input, writing to stdout or the requested output file.
//!
//! Typical usage:
//!
//! ```no_run
//! use hashtocrack::engine::{Options, run};
//! # fn main() -> anyhow::Result<()> {
//! let opts = Options::new("/path/to/ntds.txt").with_crackfile("/path/to/hashcat.potfile");
//! let outcome = run(&opts)?;
//! eprintln!("{} lines scanned", outcome.stats.lines);
//! # Ok(())
//! # }
//! ```
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::info;

use crate::entry::{AccountFilter, ScanStats};
use crate::extract::extract_hashes;
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, iter_lines_auto, open_output};
use crate::matched::is_matched_file;
use crate::matcher::match_accounts;
use crate::pot::load_potfile;
use crate::report::{ReportOptions, render_report};
use crate::stats::collect_stats;

/// Default size of the top-passwords table.
pub const DEFAULT_TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// NT hashes of the admitted accounts.
    Extract,
    /// Accounts joined with a potfile.
    Match { crackfile: PathBuf },
    /// Statistics over a matched file.
    Analytics,
}

impl Mode {
    /// What a file target holds once the run completes.
    pub fn artifact(&self) -> &'static str {
        match self {
            Mode::Extract => "Hashes",
            Mode::Match { .. } => "Matched results",
            Mode::Analytics => "Analytics report",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Extract => f.write_str("extract"),
            Mode::Match { .. } => f.write_str("match"),
            Mode::Analytics => f.write_str("analytics"),
        }
    }
}

/// Everything a run needs; built by the CLI from its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: PathBuf,
    pub crackfile: Option<PathBuf>,
    pub outfile: Option<PathBuf>,
    pub filter: AccountFilter,
    /// Forces analytics mode and adds the compliance section.
    pub passpol: bool,
    /// Mask passwords in the analytics report.
    pub redact: bool,
    pub top_limit: usize,
    pub mmap_threshold_bytes: u64,
}

impl Options {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            crackfile: None,
            outfile: None,
            filter: AccountFilter::default(),
            passpol: false,
            redact: false,
            top_limit: DEFAULT_TOP_LIMIT,
            mmap_threshold_bytes: DEFAULT_MMAP_THRESHOLD_BYTES,
        }
    }

    pub fn with_crackfile<P: Into<PathBuf>>(mut self, crackfile: P) -> Self {
        self.crackfile = Some(crackfile.into());
        self
    }

    pub fn with_outfile<P: Into<PathBuf>>(mut self, outfile: P) -> Self {
        self.outfile = Some(outfile.into());
        self
    }
}

/// A crack file selects match mode and must exist; otherwise `passpol` or a
/// matched-looking first line selects analytics, and everything else is
/// extract.
pub fn select_mode(opts: &Options) -> Result<Mode> {
    if let Some(crackfile) = &opts.crackfile {
        if !crackfile.exists() {
            bail!("File '{}' not found", crackfile.display());
        }
        return Ok(Mode::Match {
            crackfile: crackfile.clone(),
        });
    }
    if opts.passpol || is_matched_file(&opts.input) {
        return Ok(Mode::Analytics);
    }
    Ok(Mode::Extract)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub mode: Mode,
    pub stats: ScanStats,
    /// Set when output went to a file rather than stdout.
    pub written_to: Option<PathBuf>,
}

pub fn run(opts: &Options) -> Result<RunOutcome> {
    let mode = select_mode(opts)?;
    info!("{} mode on {}", mode, opts.input.display());
    let stats = run_mode(&mode, opts)?;
    info!("{} done: {}", mode, stats);
    Ok(RunOutcome {
        mode,
        stats,
        written_to: opts.outfile.clone(),
    })
}

fn run_mode(mode: &Mode, opts: &Options) -> Result<ScanStats> {
    let threshold = opts.mmap_threshold_bytes;
    match mode {
        Mode::Extract => {
            let lines = iter_lines_auto(&opts.input, threshold)?;
            let mut out = open_output(opts.outfile.as_deref())?;
            let stats = extract_hashes(lines, opts.filter, &mut out)?;
            finish(out, opts.outfile.as_deref())?;
            Ok(stats)
        }
        Mode::Match { crackfile } => {
            let pot = load_potfile(crackfile, threshold)?;
            info!("loaded {} cracked hashes from {}", pot.len(), crackfile.display());
            let lines = iter_lines_auto(&opts.input, threshold)?;
            let mut out = open_output(opts.outfile.as_deref())?;
            let stats = match_accounts(lines, &pot, opts.filter, &mut out)?;
            finish(out, opts.outfile.as_deref())?;
            Ok(stats)
        }
        Mode::Analytics => {
            let lines = iter_lines_auto(&opts.input, threshold)?;
            let (acc, stats) = collect_stats(lines, opts.filter)?;
            let summary = acc.finalize(opts.top_limit);
            let report = render_report(
                &summary,
                &ReportOptions {
                    filter: opts.filter,
                    show_policy: opts.passpol,
                    redact: opts.redact,
                },
            );
            let mut out = open_output(opts.outfile.as_deref())?;
            out.write_all(report.as_bytes()).context("write report")?;
            finish(out, opts.outfile.as_deref())?;
            Ok(stats)
        }
    }
}

fn finish(mut out: Box<dyn Write>, target: Option<&Path>) -> Result<()> {
    let name = target.map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    out.flush().with_context(|| format!("flush {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const BOB: &str = "corp\\bob:1105:aad3b435b51404eeaad3b435b51404ee:5835048ce94ad0564e29a924a03510ef::: (status=Enabled)";

    #[test]
    fn mode_selection() {
        let dir = tempdir().unwrap();
        let dump = dir.path().join("ntds.txt");
        fs::write(&dump, format!("{BOB}\n")).unwrap();
        let matched = dir.path().join("matched.txt");
        fs::write(&matched, "corp\\bob:h:pw:Enabled\n").unwrap();
        let pot = dir.path().join("hashcat.potfile");
        fs::write(&pot, "h:pw\n").unwrap();

        assert_eq!(select_mode(&Options::new(&dump)).unwrap(), Mode::Extract);
        assert_eq!(select_mode(&Options::new(&matched)).unwrap(), Mode::Analytics);

        let mut forced = Options::new(&dump);
        forced.passpol = true;
        assert_eq!(select_mode(&forced).unwrap(), Mode::Analytics);

        let with_pot = Options::new(&dump).with_crackfile(&pot);
        assert_eq!(
            select_mode(&with_pot).unwrap(),
            Mode::Match { crackfile: pot.clone() }
        );
    }

    #[test]
    fn missing_crackfile_is_fatal() {
        let dir = tempdir().unwrap();
        let dump = dir.path().join("ntds.txt");
        fs::write(&dump, format!("{BOB}\n")).unwrap();
        let opts = Options::new(&dump).with_crackfile(dir.path().join("nope.pot"));
        let err = select_mode(&opts).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn match_then_analytics_through_files() {
        let dir = tempdir().unwrap();
        let dump = dir.path().join("ntds.txt");
        fs::write(
            &dump,
            format!("{BOB}\ncorp\\eve:1107:lm:eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee::: (status=Enabled)\n"),
        )
        .unwrap();
        let pot = dir.path().join("hashcat.potfile");
        fs::write(&pot, "5835048CE94AD0564E29A924A03510EF:Summer2024!\n").unwrap();
        let matched = dir.path().join("out").join("matched.txt");

        let outcome = run(&Options::new(&dump).with_crackfile(&pot).with_outfile(&matched)).unwrap();
        assert_eq!(outcome.stats.emitted, 2);
        assert_eq!(outcome.written_to.as_deref(), Some(matched.as_path()));
        assert_eq!(
            fs::read_to_string(&matched).unwrap(),
            "corp\\bob:5835048ce94ad0564e29a924a03510ef:Summer2024!:Enabled\ncorp\\eve:eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee::Enabled\n"
        );

        let report_path = dir.path().join("report.txt");
        let outcome = run(&Options::new(&matched).with_outfile(&report_path)).unwrap();
        assert_eq!(outcome.mode, Mode::Analytics);
        let report = fs::read_to_string(&report_path).unwrap();
        assert!(report.contains("Passwords Cracked:        1 (50.00%)"));
        assert!(!report.contains("PASSWORD POLICY COMPLIANCE ANALYSIS"));
    }

    #[test]
    fn extract_through_mmap_path() {
        let dir = tempdir().unwrap();
        let dump = dir.path().join("ntds.txt");
        fs::write(&dump, format!("{BOB}\n{BOB}\n")).unwrap();
        let out = dir.path().join("hashes.txt");
        let mut opts = Options::new(&dump).with_outfile(&out);
        opts.mmap_threshold_bytes = 1;
        let outcome = run(&opts).unwrap();
        assert_eq!(outcome.mode, Mode::Extract);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "5835048ce94ad0564e29a924a03510ef\n5835048ce94ad0564e29a924a03510ef\n"
        );
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(run(&Options::new(dir.path().join("missing.txt"))).is_err());
    }
}
