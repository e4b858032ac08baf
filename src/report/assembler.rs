//! Report assembly.
//!
//! Projects a [`CalculationResult`] into flat report rows in the fixed
//! output column order, plus a summary with the run totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CalculationSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{BenefitRecord, CalculationResult, ExclusionContribution, RunWarning};

/// Rendered in place of an unknown admission date.
pub const NOT_APPLICABLE: &str = "N/A";

/// One line of the benefit report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Employee registration number.
    pub registration: String,
    /// Display name.
    pub name: String,
    /// Job title.
    pub job_title: String,
    /// Union / group name.
    pub group: String,
    /// Working days used.
    pub working_days: u32,
    /// Total benefit value.
    pub total: Decimal,
    /// Employer's share.
    pub employer_cost: Decimal,
    /// Employee's discount.
    pub employee_discount: Decimal,
    /// Formatted admission date, or `N/A`.
    pub admission_date: String,
    /// Competence period label.
    pub competence_period: String,
    /// Observation flags, or `OK`.
    pub observation: String,
}

impl ReportRow {
    /// Projects one record, formatting the admission date with `date_format`.
    pub fn from_record(record: &BenefitRecord, date_format: &str) -> Self {
        Self {
            registration: record.employee.key.to_string(),
            name: record.employee.name.clone(),
            job_title: record.employee.job_title.clone(),
            group: record.employee.group.clone(),
            working_days: record.working_days,
            total: record.total,
            employer_cost: record.employer_cost,
            employee_discount: record.employee_discount,
            admission_date: record
                .admission_date
                .map(|date| date.format(date_format).to_string())
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            competence_period: record.competence_period.clone(),
            observation: record.observation(),
        }
    }
}

/// Totals of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of employees in the report.
    pub employees: usize,
    /// Sum of every row's total.
    pub total_value: Decimal,
    /// Sum of employer costs.
    pub employer_cost: Decimal,
    /// Sum of employee discounts.
    pub employee_discount: Decimal,
    /// Employees of the base population removed by exclusions.
    pub excluded_employees: usize,
    /// Recoverable problems found during the run.
    pub warnings: Vec<RunWarning>,
}

/// The assembled output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitReport {
    /// The run this report belongs to.
    pub run_id: Uuid,
    /// The competence period label.
    pub competence_period: String,
    /// One row per surviving employee, in base-population order.
    pub rows: Vec<ReportRow>,
    /// Run totals and warnings.
    pub summary: RunSummary,
    /// What each exclusion source contributed.
    pub exclusions: Vec<ExclusionContribution>,
}

/// Assembles the report of a run.
///
/// # Errors
///
/// Returns [`EngineError::AmountOverflow`] when a summary sum exceeds the
/// decimal range.
///
/// # Example
///
/// ```
/// use benefit_engine::calculation::run_benefit;
/// use benefit_engine::config::BenefitConfig;
/// use benefit_engine::models::{Cell, Table};
/// use benefit_engine::report::assemble_report;
/// use benefit_engine::sources::{SourceBundle, SourceKind};
///
/// let config = BenefitConfig::default();
/// let sources = SourceBundle::new()
///     .with(
///         SourceKind::ActiveEmployees,
///         Table::new("", ["MATRICULA", "SINDICATO"])
///             .with_row(vec![Cell::from("1"), Cell::from("SINDPD SP")]),
///     )
///     .with(SourceKind::UnionRates, Table::new("", ["SINDICATO", "VALOR"]));
///
/// let result = run_benefit(&sources, &config)?;
/// let report = assemble_report(&result, config.calculation())?;
///
/// assert_eq!(report.rows[0].admission_date, "N/A");
/// assert_eq!(report.rows[0].observation, "standard working days (22)");
/// assert_eq!(report.summary.total_value.to_string(), "825");
/// # Ok::<(), benefit_engine::error::EngineError>(())
/// ```
pub fn assemble_report(
    result: &CalculationResult,
    settings: &CalculationSettings,
) -> EngineResult<BenefitReport> {
    let rows: Vec<ReportRow> = result
        .records
        .iter()
        .map(|record| ReportRow::from_record(record, &settings.date_format))
        .collect();

    let summary = RunSummary {
        employees: rows.len(),
        total_value: checked_sum(rows.iter().map(|r| r.total), "total value")?,
        employer_cost: checked_sum(rows.iter().map(|r| r.employer_cost), "employer cost")?,
        employee_discount: checked_sum(
            rows.iter().map(|r| r.employee_discount),
            "employee discount",
        )?,
        excluded_employees: result.excluded_employees,
        warnings: result.warnings.clone(),
    };

    Ok(BenefitReport {
        run_id: result.run_id,
        competence_period: result.competence_period.clone(),
        rows,
        summary,
        exclusions: result.exclusions.clone(),
    })
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>, what: &str) -> EngineResult<Decimal> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| EngineError::AmountOverflow {
                context: format!("summary {}", what),
            })
    })
}
