//! CLI Output Formatting Module
//! Consistent, colorized output for terminal UX

use colored::Colorize;

pub struct CliFormatter;

impl CliFormatter {
    pub fn success(message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message);
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue().bold(), message);
    }

    pub fn header(title: &str) {
        println!("\n{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.chars().count()).bright_black());
    }

    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.bright_white().bold(), value);
    }

    pub fn table_header(columns: &[&str]) {
        let header = columns
            .iter()
            .map(|c| format!("{:<14}", c))
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("  {}", header.bright_white().bold());
        println!("  {}", "─".repeat(header.chars().count()).bright_black());
    }

    pub fn table_row(values: &[&str]) {
        let row = values
            .iter()
            .map(|v| format!("{:<14}", v))
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("  {}", row);
    }

    /// Print an access decision line
    pub fn decision(allowed: bool, detail: &str) {
        if allowed {
            println!("{} {}", "ALLOW".green().bold(), detail);
        } else {
            println!("{} {}", "DENY".red().bold(), detail);
        }
    }
}

/// Yes/no marker for table cells
pub fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "-"
    }
}

/// Human-readable remaining time, e.g. for trial expiry
pub fn format_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "expired".to_string();
    }
    let seconds = seconds as u64;
    if seconds < 3600 {
        format!("{}m", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86_400, (seconds % 86_400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "expired");
        assert_eq!(format_remaining(-30), "expired");
        assert_eq!(format_remaining(90), "1m");
        assert_eq!(format_remaining(3660), "1h 1m");
        assert_eq!(format_remaining(90_000), "1d 1h");
    }

    #[test]
    fn test_flag() {
        assert_eq!(flag(true), "yes");
        assert_eq!(flag(false), "-");
    }
}
