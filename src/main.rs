//! CLI entrypoint for `hashtocrack`.
//!
//! Normalises the tool's single-dash long flags, parses arguments, builds the
//! library [`Options`] and runs exactly one mode: extract, match or
//! analytics. Fatal errors are logged and exit with status 1.
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};
use colored::Colorize;
use hashtocrack::{
    engine::{DEFAULT_TOP_LIMIT, Options, run},
    entry::AccountFilter,
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
};
use log::{LevelFilter, error};

const USAGE: &str = "\
hashtocrack <ntdsfile> [-disabled] [-machines] [-o <outfile>]
       hashtocrack <ntdsfile> <crackfile> [-disabled] [-machines] [-o <outfile>]
       hashtocrack <analyticsfile> [-disabled] [-machines] [-passpol] [-report] [-o <outfile>]
       hashtocrack help";

const AFTER_LONG_HELP: &str = r#"MODES:
  1. EXTRACT    hashtocrack <ntdsfile>
     Prints the NT hash of every enabled user account. -disabled and
     -machines widen the selection.

  2. MATCH      hashtocrack <ntdsfile> <crackfile>
     Joins the accounts with a hashcat potfile.
     Output format: username:hash:password:status

  3. ANALYTICS  hashtocrack <analyticsfile> [-passpol] [-report]
     Reports totals, password length distribution, the most used passwords
     and, with -passpol, DOMAIN_PASSWORD_COMPLEX compliance. Selected by
     -passpol or when the first line looks like match output.

NTDS FILE FORMAT:
  domain\username:RID:LMHash:NTHash::: (status=Enabled|Disabled)

CRACKFILE FORMAT:
  hash:password

Single-dash spellings (-disabled, -machines, -passpol, -report, -outfile)
are accepted as well."#;

#[derive(Parser, Debug)]
#[command(
    name = "hashtocrack",
    version,
    about = "NTDS hash extractor, potfile matcher and password analytics",
    override_usage = USAGE,
    after_long_help = AFTER_LONG_HELP
)]
struct Args {
    /// NTDS dump, or a matched file for analytics
    input: Option<PathBuf>,

    /// Hashcat potfile; selects match mode
    crackfile: Option<PathBuf>,

    /// Include disabled accounts
    #[arg(long = "disabled")]
    disabled: bool,

    /// Include machine accounts (names ending with $)
    #[arg(long = "machines")]
    machines: bool,

    /// Analytics: add password policy compliance statistics
    #[arg(long = "passpol")]
    passpol: bool,

    /// Analytics: redact passwords (first 3 characters shown)
    #[arg(long = "report")]
    report: bool,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "outfile")]
    outfile: Option<PathBuf>,

    /// Limit number of entries in the most used passwords table
    #[arg(
        long = "top",
        default_value_t = DEFAULT_TOP_LIMIT,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    top_limit: usize,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Increase verbosity (--verbose, --verbose --verbose)
    #[arg(long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

const SINGLE_DASH_FLAGS: &[&str] = &["-disabled", "-machines", "-passpol", "-report", "-outfile"];

/// Rewrite `-disabled` style flags to `--disabled`. The value after
/// `-o`/`-outfile` is passed through untouched.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut out = Vec::new();
    let mut takes_value = false;
    for arg in args {
        if takes_value {
            takes_value = false;
            out.push(arg);
            continue;
        }
        let rewritten = match arg.to_str() {
            Some(s) if SINGLE_DASH_FLAGS.contains(&s) => OsString::from(format!("-{s}")),
            _ => arg,
        };
        takes_value = matches!(rewritten.to_str(), Some("-o" | "--outfile"));
        out.push(rewritten);
    }
    out
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn main() {
    let argv = normalize_args(std::env::args_os());
    let Some(first) = argv.get(1) else {
        eprintln!("Usage: {}\n\nRun 'hashtocrack help' for more information.", USAGE);
        std::process::exit(1);
    };
    match first.to_string_lossy().to_lowercase().as_str() {
        "help" | "-h" | "--help" => {
            let _ = Args::command().print_long_help();
            return;
        }
        "version" | "-v" | "--version" => {
            println!("hashtocrack v{}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    let args = Args::parse_from(argv);
    init_logger(args.verbose);
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }

    let Some(input) = args.input else {
        eprintln!("Usage: {}", USAGE);
        std::process::exit(1);
    };
    let opts = Options {
        input,
        crackfile: args.crackfile,
        outfile: args.outfile,
        filter: AccountFilter::new(args.disabled, args.machines),
        passpol: args.passpol,
        redact: args.report,
        top_limit: args.top_limit,
        mmap_threshold_bytes: if args.mmap_threshold == 0 {
            u64::MAX
        } else {
            args.mmap_threshold
        },
    };

    match run(&opts) {
        Ok(outcome) => {
            if let Some(path) = &outcome.written_to {
                eprintln!(
                    "{} {} written to: {}",
                    "[+]".green().bold(),
                    outcome.mode.artifact(),
                    path.display()
                );
            }
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn single_dash_flags_become_long_flags() {
        let got = normalize_args(os(&["bin", "ntds.txt", "-disabled", "-machines", "-outfile", "x"]));
        assert_eq!(
            got,
            os(&["bin", "ntds.txt", "--disabled", "--machines", "--outfile", "x"])
        );
    }

    #[test]
    fn outfile_value_is_not_rewritten() {
        let got = normalize_args(os(&["bin", "m.txt", "-o", "-report", "-report"]));
        assert_eq!(got, os(&["bin", "m.txt", "-o", "-report", "--report"]));
    }

    #[test]
    fn args_parse_after_normalization() {
        let argv = normalize_args(os(&["hashtocrack", "m.txt", "-passpol", "-report", "--top", "5"]));
        let args = Args::try_parse_from(argv).unwrap();
        assert!(args.passpol);
        assert!(args.report);
        assert_eq!(args.top_limit, 5);
        assert!(args.crackfile.is_none());
    }

    #[test]
    fn top_limit_must_be_positive() {
        let argv = normalize_args(os(&["hashtocrack", "m.txt", "--top", "0"]));
        assert!(Args::try_parse_from(argv).is_err());
        let argv = normalize_args(os(&["hashtocrack", "m.txt", "--top", "1"]));
        assert_eq!(Args::try_parse_from(argv).unwrap().top_limit, 1);
    }

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }
}
