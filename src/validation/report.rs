// Textual rendering of a validation report
//
// Every mismatch is listed with the full channel address, the expected and
// actual values and the mismatch kind, so a discrepancy can be chased from
// the report alone. An empty report renders an explicit no-errors banner so
// an operator can tell "passed" apart from "never ran".

use std::fmt::Write as _;

use super::{MismatchKind, ValidationReport};

/// Aggregates a report into operator-facing summary text
pub struct ReportSink;

impl ReportSink {
    /// Render the report
    pub fn emit(report: &ValidationReport) -> String {
        let mut out = String::new();
        out.push_str("Validation result:\n");

        for entry in report.entries() {
            let address = match &entry.address {
                Some(address) => address.to_string(),
                None => "<unparsed line>".to_string(),
            };
            match entry.kind {
                MismatchKind::MeanMismatch | MismatchKind::SpreadMismatch => {
                    let _ = writeln!(
                        out,
                        "MISMATCH {} {} : expected mean {} spread {} -> actual mean {} spread {}",
                        kind_label(entry.kind),
                        address,
                        fmt_opt(entry.expected_mean),
                        fmt_opt(entry.expected_spread),
                        fmt_opt(entry.actual_mean),
                        fmt_opt(entry.actual_spread),
                    );
                }
                MismatchKind::MissingChannel => {
                    let _ = writeln!(
                        out,
                        "MISSING CHANNEL {} : expected mean {} spread {}",
                        address,
                        fmt_opt(entry.expected_mean),
                        fmt_opt(entry.expected_spread),
                    );
                }
                MismatchKind::ReadError => {
                    let _ = writeln!(
                        out,
                        "READ ERROR {} : {}",
                        address,
                        entry.detail.as_deref().unwrap_or("unknown failure"),
                    );
                }
            }
        }

        if report.passed() {
            out.push_str(" ********************************* \n");
            out.push_str(" ***                           *** \n");
            out.push_str(" ***      NO ERRORS FOUND      *** \n");
            out.push_str(" ***                           *** \n");
            out.push_str(" ********************************* \n");
        } else {
            let _ = writeln!(out, "{} error(s) found", report.len());
        }

        out
    }
}

fn kind_label(kind: MismatchKind) -> &'static str {
    match kind {
        MismatchKind::MeanMismatch => "ON MEAN",
        MismatchKind::SpreadMismatch => "ON SPREAD",
        MismatchKind::MissingChannel => "MISSING",
        MismatchKind::ReadError => "READ",
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::WireAddress;
    use crate::validation::MismatchEntry;

    #[test]
    fn test_empty_report_emits_no_errors_banner() {
        let report = ValidationReport::new();
        let text = ReportSink::emit(&report);
        assert!(text.contains("NO ERRORS FOUND"));
    }

    #[test]
    fn test_mismatch_lines_carry_full_detail() {
        let addr = WireAddress::new(0, 1, 3, 2, 1, 0);
        let mut report = ValidationReport::new();
        report.push(MismatchEntry::mean_mismatch(addr, 850.0, 12.3, 850.02, 12.31));

        let text = ReportSink::emit(&report);
        assert!(text.contains("MISMATCH ON MEAN"));
        assert!(text.contains("Wh:0 St:1 Se:3 Sl:2 La:1 Wi:0"));
        assert!(text.contains("850"));
        assert!(text.contains("850.02"));
        assert!(!text.contains("NO ERRORS FOUND"));
        assert!(text.contains("1 error(s) found"));
    }

    #[test]
    fn test_read_error_without_address() {
        let mut report = ValidationReport::new();
        report.push(MismatchEntry::read_error(
            None,
            "Cannot parse reference line 7: 'garbage'".to_string(),
        ));
        let text = ReportSink::emit(&report);
        assert!(text.contains("READ ERROR <unparsed line>"));
        assert!(text.contains("line 7"));
    }

    #[test]
    fn test_missing_channel_line() {
        let addr = WireAddress::new(-1, 2, 7, 1, 1, 0);
        let mut report = ValidationReport::new();
        report.push(MismatchEntry::missing_channel(addr, 100.0, 2.0));
        let text = ReportSink::emit(&report);
        assert!(text.contains("MISSING CHANNEL"));
        assert!(text.contains("Wh:-1"));
    }
}
