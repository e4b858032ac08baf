//! Admission lookups.
//!
//! Employees listed in the admissions source joined the company during the
//! competence period. When the source provides a usable admission date, the
//! record carries that date and the "recent admission" flag.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::models::{Cell, EmployeeKey, RunWarning, Table, WarningCode};

use super::column_resolver::{ColumnRole, resolve_in_table};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
];

/// Spreadsheet serial dates count days from this epoch.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// Parses an admission date cell.
///
/// Accepts ISO and day-first text dates, with or without a time part, and
/// spreadsheet serial day numbers.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::parse_admission_date;
/// use benefit_engine::models::Cell;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 4, 15);
/// assert_eq!(parse_admission_date(&Cell::from("2025-04-15")), expected);
/// assert_eq!(parse_admission_date(&Cell::from("15/04/2025")), expected);
/// assert_eq!(parse_admission_date(&Cell::from("2025-04-15 00:00:00")), expected);
/// assert_eq!(parse_admission_date(&Cell::Number(45762.0)), expected);
/// assert_eq!(parse_admission_date(&Cell::from("abril")), None);
/// ```
pub fn parse_admission_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(serial) => {
            if !serial.is_finite() || *serial < 1.0 || *serial > MAX_SERIAL_DAY {
                return None;
            }
            let (y, m, d) = SERIAL_EPOCH;
            NaiveDate::from_ymd_opt(y, m, d)?
                .checked_add_signed(Duration::days(serial.trunc() as i64))
        }
        Cell::Text(raw) => {
            let text = raw.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                        .map(|dt| dt.date())
                })
        }
    }
}

/// Employees admitted during the period, with their admission date when known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionIndex {
    entries: HashMap<EmployeeKey, Option<NaiveDate>>,
}

impl AdmissionIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an admission. The first entry for a key wins.
    pub fn insert(&mut self, key: EmployeeKey, date: Option<NaiveDate>) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(date);
                true
            }
        }
    }

    /// Returns true when the employee appears in the admissions source.
    pub fn contains(&self, key: &EmployeeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// The admission date of an employee, when known.
    pub fn date(&self, key: &EmployeeKey) -> Option<NaiveDate> {
        self.entries.get(key).copied().flatten()
    }

    /// Number of admitted employees.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nobody was admitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An admission index plus the warnings raised while building it.
#[derive(Debug, Clone, Default)]
pub struct AdmissionIndexBuild {
    /// The built index.
    pub index: AdmissionIndex,
    /// Problems found in the admissions source.
    pub warnings: Vec<RunWarning>,
}

/// Builds the admission index from the admissions source.
///
/// An absent source yields an empty index. A source without an identifier
/// column is skipped with a warning. A source without a date column still
/// indexes its employees, without dates. Unparseable dates are kept as
/// unknown and reported. Employees without a date are not flagged.
pub fn build_admission_index(table: Option<&Table>) -> AdmissionIndexBuild {
    let mut build = AdmissionIndexBuild::default();
    let Some(table) = table else {
        return build;
    };

    let Some(id_col) = resolve_in_table(table, ColumnRole::Identifier) else {
        let message = format!(
            "no identifier column among [{}], admissions ignored",
            table.headers.join(", ")
        );
        warn!(table = %table.name, "{}", message);
        build.warnings.push(RunWarning::new(
            WarningCode::ColumnNotFound,
            table.name.clone(),
            message,
        ));
        return build;
    };

    let date_col = resolve_in_table(table, ColumnRole::AdmissionDate).filter(|c| *c != id_col);
    if date_col.is_none() {
        let message = "no admission date column, dates reported as N/A".to_string();
        warn!(table = %table.name, "{}", message);
        build.warnings.push(RunWarning::new(
            WarningCode::ColumnNotFound,
            table.name.clone(),
            message,
        ));
    }

    for row in 0..table.len() {
        let Some(key) = table.cell(row, id_col).to_text().map(EmployeeKey::new) else {
            continue;
        };

        let date = date_col.and_then(|col| {
            let cell = table.cell(row, col);
            let parsed = parse_admission_date(cell);
            if parsed.is_none() && !cell.is_missing() {
                let message = format!("cannot parse admission date '{}' for {}", cell, key);
                warn!(table = %table.name, "{}", message);
                build.warnings.push(RunWarning::new(
                    WarningCode::UnparsableValue,
                    table.name.clone(),
                    message,
                ));
            }
            parsed
        });

        build.index.insert(key, date);
    }

    info!(
        table = %table.name,
        admissions = build.index.len(),
        "Built admission index"
    );
    build
}
