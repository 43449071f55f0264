use serde::Serialize;

use super::{failed_codes, ReportKind, ReportSource};
use crate::result::{CheckResult, CheckSummary, Severity};

#[derive(Serialize)]
struct JsonReport<'a> {
    file: String,
    kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    sp_validation_only: Option<bool>,
    errors: Vec<&'a str>,
    warnings: Vec<&'a str>,
    results: &'a [CheckResult],
    summary: &'a CheckSummary,
}

pub fn print(results: &[CheckResult], summary: &CheckSummary, source: &ReportSource) {
    let report = JsonReport {
        file: source.path.display().to_string(),
        kind: source.kind,
        sp_validation_only: (source.kind == ReportKind::Settings).then_some(source.sp_only),
        errors: failed_codes(results, Severity::Error),
        warnings: failed_codes(results, Severity::Warning),
        results,
        summary,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize JSON: {}", e),
    }
}
