pub mod json;
pub mod terminal;

use std::path::Path;

use serde::Serialize;

use crate::result::{CheckResult, CheckSummary, Severity};

/// What a report was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Settings,
    Metadata,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Settings => write!(f, "settings"),
            ReportKind::Metadata => write!(f, "metadata"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportSource<'a> {
    pub path: &'a Path,
    pub kind: ReportKind,
    /// Only meaningful for settings reports.
    pub sp_only: bool,
}

pub fn print_results(results: &[CheckResult], verbose: bool, json: bool, source: &ReportSource) {
    let summary = CheckSummary::from_results(results);

    if json {
        json::print(results, &summary, source);
    } else {
        terminal::print(results, &summary, verbose, source);
    }
}

/// Codes of the failed lines with the given severity, in report order.
pub(crate) fn failed_codes(results: &[CheckResult], severity: Severity) -> Vec<&str> {
    results
        .iter()
        .filter(|r| !r.passed && r.severity == severity)
        .map(|r| r.code.as_str())
        .collect()
}
