//! Plain-text analytics report.
//!
//! The report carries no ANSI styling so it reads the same on a terminal and
//! in an output file. Sections: filters, general statistics with a crack
//! progress bar, password length distribution, most used passwords and, on
//! request, DOMAIN_PASSWORD_COMPLEX compliance.
use crate::entry::AccountFilter;
use crate::stats::AnalyticsSummary;

const TITLE: &str = "HASHTOCRACK - Password Analytics Report";
const RULE_WIDTH: usize = 63;
const BOX_WIDTH: usize = 62;
/// Cells in the crack-progress and compliance bars.
pub const PROGRESS_BAR_WIDTH: usize = 40;
/// Cells of the longest length-distribution bar.
pub const LENGTH_BAR_WIDTH: usize = 30;
/// Longest password shown in the top table before truncation.
pub const PASSWORD_DISPLAY_WIDTH: usize = 28;
const REDACT_KEEP: usize = 3;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub filter: AccountFilter,
    /// Include the password policy compliance section.
    pub show_policy: bool,
    /// Mask passwords in the top table.
    pub redact: bool,
}

/// Keep the first three characters and star the rest.
pub fn redact(password: &str) -> String {
    let len = password.chars().count();
    if len <= REDACT_KEEP {
        return password.to_string();
    }
    let mut s: String = password.chars().take(REDACT_KEEP).collect();
    s.push_str(&"*".repeat(len - REDACT_KEEP));
    s
}

/// Cut to [`PASSWORD_DISPLAY_WIDTH`] characters, ending in `...`.
pub fn truncate_for_display(password: &str) -> String {
    if password.chars().count() <= PASSWORD_DISPLAY_WIDTH {
        return password.to_string();
    }
    let mut s: String = password
        .chars()
        .take(PASSWORD_DISPLAY_WIDTH - 3)
        .collect();
    s.push_str("...");
    s
}

fn filled_cells(fraction: f64, width: usize) -> usize {
    let cells = (fraction * width as f64).round();
    cells.clamp(0.0, width as f64) as usize
}

/// `█` for the filled share of `width` cells, `░` for the rest.
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = filled_cells(percentage / 100.0, width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn length_bar(count: usize, max_count: usize) -> String {
    if max_count == 0 {
        return String::new();
    }
    "▓".repeat(filled_cells(
        count as f64 / max_count as f64,
        LENGTH_BAR_WIDTH,
    ))
}

fn included(flag: bool) -> &'static str {
    if flag { "Included" } else { "Excluded" }
}

fn rule() -> String {
    "═".repeat(RULE_WIDTH)
}

fn section_header(title: &str) -> Vec<String> {
    vec![
        rule(),
        format!("{:^width$}", title, width = RULE_WIDTH)
            .trim_end()
            .to_string(),
        rule(),
        String::new(),
    ]
}

pub fn render_report(summary: &AnalyticsSummary, opts: &ReportOptions) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(String::new());
    lines.push(format!("╔{}╗", "═".repeat(BOX_WIDTH)));
    lines.push(format!("║{:^width$}║", TITLE, width = BOX_WIDTH));
    lines.push(format!("╚{}╝", "═".repeat(BOX_WIDTH)));
    lines.push(String::new());

    lines.push("Filters Applied:".to_string());
    lines.push(format!(
        "  • Disabled accounts: {}",
        included(opts.filter.include_disabled)
    ));
    lines.push(format!(
        "  • Machine accounts:  {}",
        included(opts.filter.include_machines)
    ));
    lines.push(String::new());

    // General statistics
    lines.extend(section_header("GENERAL STATISTICS"));
    lines.push(format!(
        "  Total Accounts Analyzed:  {}",
        summary.total_accounts
    ));
    lines.push(format!(
        "  Passwords Cracked:        {} ({:.2}%)",
        summary.cracked_accounts, summary.crack_percentage
    ));
    lines.push(format!(
        "  Passwords Not Cracked:    {} ({:.2}%)",
        summary.uncracked_accounts(),
        summary.uncracked_percentage()
    ));
    lines.push(String::new());
    lines.push(format!(
        "  Crack Progress: [{}] {:.1}%",
        progress_bar(summary.crack_percentage, PROGRESS_BAR_WIDTH),
        summary.crack_percentage
    ));
    lines.push(String::new());

    // Length distribution
    lines.extend(section_header("PASSWORD LENGTH DISTRIBUTION"));
    if summary.length_distribution.is_empty() {
        lines.push("  No cracked passwords to analyze.".to_string());
    } else {
        let max_count = summary
            .length_distribution
            .iter()
            .map(|&(_, count)| count)
            .max()
            .unwrap_or(0);
        for &(length, count) in &summary.length_distribution {
            lines.push(format!(
                "  {:>2} chars: {:<30} {:>4} ({:>6.2}%)",
                length,
                length_bar(count, max_count),
                count,
                summary.share_of_cracked(count)
            ));
        }
    }
    lines.push(String::new());

    // Most used passwords
    let title = format!("TOP {} MOST USED PASSWORDS", summary.top_limit);
    lines.extend(section_header(&title));
    if summary.top_passwords.is_empty() {
        lines.push("  No cracked passwords to analyze.".to_string());
    } else {
        lines.push(format!("  {:<4}  {:<30}  {}", "Rank", "Password", "Count"));
        lines.push(format!("  {}  {}  {}", "─".repeat(4), "─".repeat(30), "─".repeat(5)));
        for (i, pc) in summary.top_passwords.iter().enumerate() {
            let shown = if opts.redact {
                redact(&pc.password)
            } else {
                pc.password.clone()
            };
            lines.push(format!(
                "  #{:<3}  {:<30}  {}",
                i + 1,
                truncate_for_display(&shown),
                pc.count
            ));
        }
    }
    lines.push(String::new());

    if opts.show_policy {
        lines.extend(section_header("PASSWORD POLICY COMPLIANCE ANALYSIS"));
        lines.push("  Policy: DOMAIN_PASSWORD_COMPLEX".to_string());
        lines.push("  Requirements:".to_string());
        lines.push("    • Minimum 8 characters".to_string());
        lines.push("    • At least 3 of 4 categories:".to_string());
        lines.push("      - Uppercase letters (A-Z)".to_string());
        lines.push("      - Lowercase letters (a-z)".to_string());
        lines.push("      - Digits (0-9)".to_string());
        lines.push("      - Special characters (!@#$%^&*...)".to_string());
        lines.push(String::new());
        lines.push("  Results:".to_string());
        lines.push(format!(
            "    Compliant passwords:     {} ({:.2}% of cracked)",
            summary.complex_count, summary.complex_percentage
        ));
        lines.push(format!(
            "    Non-compliant passwords: {} ({:.2}% of cracked)",
            summary.non_complex_count(),
            summary.non_complex_percentage()
        ));
        lines.push(String::new());
        lines.push(format!(
            "  Compliance: [{}] {:.1}%",
            progress_bar(summary.complex_percentage, PROGRESS_BAR_WIDTH),
            summary.complex_percentage
        ));
        lines.push(String::new());
    }

    let mut footer = section_header("END OF REPORT");
    footer.pop();
    lines.extend(footer);

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
