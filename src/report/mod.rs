//! Benefit report assembly and export.
//!
//! The report is the caller-facing shape of a run: flat rows in a fixed
//! column order and a summary with totals, exclusions and warnings.

mod assembler;
mod csv_writer;

pub use assembler::{BenefitReport, NOT_APPLICABLE, ReportRow, RunSummary, assemble_report};
pub use csv_writer::{REPORT_HEADERS, report_to_csv, write_report_csv};
