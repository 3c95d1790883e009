//! Formatting and reporting for readiness results

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::CheckResult;

/// Formats summary rows as a pretty table
pub fn format_table(rows: &[CheckResult]) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Stage", "Item", "Status", "Duration", "Message"]);

    for row in rows {
        let duration_str = row
            .duration
            .map(|d| format!("{:.2?}", d))
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([
            row.stage,
            row.name.as_str(),
            &row.status.as_colored_str(),
            &duration_str,
            &row.message,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Formats per-row details, for rows that have them
pub fn format_details(rows: &[CheckResult]) -> String {
    let mut output = String::new();
    for row in rows {
        if let Some(details) = &row.details {
            output.push_str(&format!("\n{} Details:\n{}\n", row.name.bold(), details));
        }
    }
    output
}

/// Formats a headline verdict with a check mark or cross
pub fn format_verdict(ready: bool, label: &str) -> String {
    if ready {
        format!("{} {}", "✓".green(), label.green().bold())
    } else {
        format!("{} {}", "✗".red(), label.red().bold())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn table_lists_every_row() {
        let rows = vec![
            CheckResult::pass("readiness", "mcp_server", "healthy (HTTP 200)")
                .with_duration(Duration::from_millis(12)),
            CheckResult::warn("config", "GROQ_API_KEY", "not set"),
        ];
        let table = format_table(&rows);
        assert!(table.contains("mcp_server"));
        assert!(table.contains("GROQ_API_KEY"));
        assert!(table.contains("Message"));
    }

    #[test]
    fn details_only_for_rows_that_have_them() {
        let rows = vec![
            CheckResult::pass("readiness", "agent", "ok").with_details("  GET http://y/health"),
            CheckResult::pass("readiness", "tools", "ok"),
        ];
        let details = format_details(&rows);
        assert!(details.contains("GET http://y/health"));
        assert!(!details.contains("tools"));
    }
}
