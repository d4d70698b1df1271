//! Record types produced by the line parsers and the account filter shared by
//! every mode.
//!
//! [`AccountEntry`] is one line of an NTDS-style account listing and
//! [`CrackedEntry`] is one line of a matched file. Both expose their
//! disabled/machine flags through [`AccountFlags`] so that [`AccountFilter`]
//! applies the same inclusion rules in extract, match and analytics runs.
use std::fmt;

/// Account status as written in matched files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Enabled,
    Disabled,
}

impl Status {
    pub fn from_disabled(is_disabled: bool) -> Self {
        if is_disabled {
            Status::Disabled
        } else {
            Status::Enabled
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Enabled => "Enabled",
            Status::Disabled => "Disabled",
        }
    }

    /// Parse the exact status field of a matched line.
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "Enabled" => Some(Status::Enabled),
            "Disabled" => Some(Status::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for machine accounts (`HOST$`).
pub fn is_machine_name(username: &str) -> bool {
    username.ends_with('$')
}

/// A parsed line of an account listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub username: String,
    pub rid: String,
    pub lm_hash: String,
    pub nt_hash: String,
    pub is_disabled: bool,
    pub is_machine: bool,
    /// Cleaned source line, kept for diagnostics.
    pub raw_line: String,
}

impl AccountEntry {
    pub fn status(&self) -> Status {
        Status::from_disabled(self.is_disabled)
    }
}

/// A parsed line of a matched file (`username:hash:password:status`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackedEntry {
    pub username: String,
    pub nt_hash: String,
    pub is_disabled: bool,
    pub is_machine: bool,
    /// Empty when the hash was not cracked.
    pub password: String,
    pub cracked: bool,
}

pub trait AccountFlags {
    fn is_disabled(&self) -> bool;
    fn is_machine(&self) -> bool;
}

impl AccountFlags for AccountEntry {
    fn is_disabled(&self) -> bool {
        self.is_disabled
    }
    fn is_machine(&self) -> bool {
        self.is_machine
    }
}

impl AccountFlags for CrackedEntry {
    fn is_disabled(&self) -> bool {
        self.is_disabled
    }
    fn is_machine(&self) -> bool {
        self.is_machine
    }
}

/// Which account kinds a run keeps. The default keeps enabled user accounts
/// only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccountFilter {
    pub include_disabled: bool,
    pub include_machines: bool,
}

impl AccountFilter {
    pub fn new(include_disabled: bool, include_machines: bool) -> Self {
        Self {
            include_disabled,
            include_machines,
        }
    }

    pub fn admits<T: AccountFlags + ?Sized>(&self, entry: &T) -> bool {
        if entry.is_disabled() && !self.include_disabled {
            return false;
        }
        if entry.is_machine() && !self.include_machines {
            return false;
        }
        true
    }
}

/// Per-run line counters, logged once a scan completes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: usize,
    pub emitted: usize,
    pub filtered: usize,
    pub malformed: usize,
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lines={}, emitted={}, filtered={}, malformed={}",
            self.lines, self.emitted, self.filtered, self.malformed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cracked(is_disabled: bool, is_machine: bool) -> CrackedEntry {
        CrackedEntry {
            username: "DOM\\x".into(),
            nt_hash: "h".into(),
            is_disabled,
            is_machine,
            password: String::new(),
            cracked: false,
        }
    }

    #[test]
    fn default_filter_keeps_enabled_users_only() {
        let f = AccountFilter::default();
        assert!(f.admits(&cracked(false, false)));
        assert!(!f.admits(&cracked(true, false)));
        assert!(!f.admits(&cracked(false, true)));
        assert!(!f.admits(&cracked(true, true)));
    }

    #[test]
    fn flags_widen_the_filter_independently() {
        let disabled = AccountFilter::new(true, false);
        assert!(disabled.admits(&cracked(true, false)));
        assert!(!disabled.admits(&cracked(true, true)));

        let all = AccountFilter::new(true, true);
        assert!(all.admits(&cracked(true, true)));
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!(Status::parse("Enabled"), Some(Status::Enabled));
        assert_eq!(Status::parse("Disabled"), Some(Status::Disabled));
        assert_eq!(Status::parse("disabled"), None);
        assert_eq!(Status::from_disabled(true).to_string(), "Disabled");
    }

    #[test]
    fn machine_names_end_with_dollar() {
        assert!(is_machine_name("CORP\\WS01$"));
        assert!(!is_machine_name("CORP\\alice"));
        assert!(!is_machine_name("$admin"));
    }
}
