//! `check` command output

use std::fmt::Write;

use crate::check::{CheckReport, Severity};

/// Render a check report, one issue per line followed by a summary
pub fn format_report(name: &str, report: &CheckReport) -> String {
    let mut out = String::new();
    for issue in &report.issues {
        let level = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let _ = writeln!(out, "{name}:{}: {level}: {}", issue.offset, issue.message);
    }
    if report.is_clean() {
        let _ = writeln!(out, "{name}: ok");
    } else {
        let _ = writeln!(
            out,
            "{name}: {} error(s), {} warning(s)",
            report.error_count, report.warning_count
        );
    }
    out
}
