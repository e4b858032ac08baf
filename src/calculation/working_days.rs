//! Working-days resolution.
//!
//! The working-days source is a reference table whose first value is the
//! number of working days in the competence period. One scalar applies to
//! every employee of the run.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::CalculationSettings;
use crate::models::{Cell, DaysSource, RunWarning, Table, WarningCode};

use super::column_resolver::{ColumnRole, resolve_in_table};

/// The working-days value of a run and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDays {
    /// Number of working days in the period.
    pub days: u32,
    /// Whether `days` came from the source or the configured default.
    pub source: DaysSource,
}

impl WorkingDays {
    /// A value read from the working-days source.
    pub fn from_source(days: u32) -> Self {
        Self {
            days,
            source: DaysSource::Source,
        }
    }

    /// The configured default.
    pub fn default_days(days: u32) -> Self {
        Self {
            days,
            source: DaysSource::Default,
        }
    }

    /// Returns true when the default was used.
    pub fn is_default(&self) -> bool {
        self.source == DaysSource::Default
    }
}

/// The resolved working days plus any warning raised while reading them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDaysResolution {
    /// The value to apply to every employee.
    pub working_days: WorkingDays,
    /// Set when the source existed but could not be used.
    pub warning: Option<RunWarning>,
}

/// Parses a day-count cell, truncating any fractional part.
///
/// Text has whitespace removed and a decimal comma turned into a point;
/// everything from the first point on is dropped (`"21,5"` reads as 21).
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::parse_day_count;
/// use benefit_engine::models::Cell;
///
/// assert_eq!(parse_day_count(&Cell::Number(21.0)), Some(21));
/// assert_eq!(parse_day_count(&Cell::from(" 20,0 ")), Some(20));
/// assert_eq!(parse_day_count(&Cell::from("vinte")), None);
/// ```
pub fn parse_day_count(cell: &Cell) -> Option<u32> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) if n.is_finite() && *n >= 0.0 && *n < f64::from(u32::MAX) => {
            Some(n.trunc() as u32)
        }
        Cell::Number(_) => None,
        Cell::Text(raw) => {
            let cleaned: String = raw
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            cleaned.split('.').next()?.parse().ok()
        }
    }
}

/// Resolves the run's working days.
///
/// Uses the first row of the day-count column of `table`. Falls back to
/// `settings.default_working_days` when the table is absent or empty, has no
/// day-count column, or its value is unparseable or outside
/// `min_working_days..=max_working_days`. Only the last three cases produce
/// a warning: an absent source is a normal configuration.
pub fn resolve_working_days(
    table: Option<&Table>,
    settings: &CalculationSettings,
) -> WorkingDaysResolution {
    let default = WorkingDays::default_days(settings.default_working_days);

    let Some(table) = table.filter(|t| !t.is_empty()) else {
        info!(
            days = default.days,
            "No working-days source, using default"
        );
        return WorkingDaysResolution {
            working_days: default,
            warning: None,
        };
    };

    let defaulted = |message: String, code: WarningCode| {
        warn!(table = %table.name, days = default.days, "{}", message);
        WorkingDaysResolution {
            working_days: default,
            warning: Some(RunWarning::new(code, table.name.clone(), message)),
        }
    };

    let Some(column) = resolve_in_table(table, ColumnRole::DayCount) else {
        return defaulted(
            format!(
                "no day-count column among [{}], using {} working days",
                table.headers.join(", "),
                default.days
            ),
            WarningCode::ColumnNotFound,
        );
    };

    let cell = table.cell(0, column);
    let bounds = settings.min_working_days..=settings.max_working_days;

    match parse_day_count(cell) {
        Some(days) if bounds.contains(&days) => {
            info!(table = %table.name, days, "Resolved working days from source");
            WorkingDaysResolution {
                working_days: WorkingDays::from_source(days),
                warning: None,
            }
        }
        Some(days) => defaulted(
            format!(
                "working days {} outside {}..={}, using {}",
                days, settings.min_working_days, settings.max_working_days, default.days
            ),
            WarningCode::UnparsableValue,
        ),
        None => defaulted(
            format!(
                "cannot parse working days '{}', using {}",
                cell, default.days
            ),
            WarningCode::UnparsableValue,
        ),
    }
}
