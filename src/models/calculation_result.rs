//! Calculation result models for the benefit engine.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures: the per-employee [`BenefitRecord`], the observation flags
//! attached to it, the audit steps recording each decision, and the
//! warnings accumulated by a run.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EmployeeKey, EmployeeRecord};

/// Which lookup tier produced an employee's daily rate.
///
/// # Example
///
/// ```
/// use benefit_engine::models::RateSource;
///
/// let source = RateSource::Keyword { fragment: "SINDPD SP".to_string() };
/// assert_eq!(
///     serde_json::to_string(&source).unwrap(),
///     r#"{"tier":"keyword","fragment":"SINDPD SP"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum RateSource {
    /// The group name matched a rate-table entry exactly.
    Exact,
    /// The group name contained a keyword fallback fragment.
    Keyword {
        /// The fragment that matched.
        fragment: String,
    },
    /// The group name contained a region fallback code.
    Region {
        /// The region code that matched.
        fragment: String,
    },
    /// No tier produced a non-zero rate.
    Unresolved,
}

/// Where the working-days value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaysSource {
    /// Read from the working-days source.
    Source,
    /// The configured default was used.
    Default,
}

/// A flag contributing to the free-text observation of a record.
///
/// Flags are always rendered in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    /// The employee appears in the admissions source.
    RecentAdmission,
    /// No rate tier produced a value.
    ZeroValueRate,
    /// The default working-days value was used.
    DefaultWorkingDays(u32),
    /// The employee is on vacation or leave.
    OnLeave,
    /// The employee was terminated.
    Terminated,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::RecentAdmission => write!(f, "recent admission"),
            Observation::ZeroValueRate => write!(f, "zero value — check union"),
            Observation::DefaultWorkingDays(days) => {
                write!(f, "standard working days ({})", days)
            }
            Observation::OnLeave => write!(f, "on leave"),
            Observation::Terminated => write!(f, "terminated"),
        }
    }
}

/// A single step in the audit trail recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number within the record.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Kinds of recoverable problems found during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// A rate, day-count or date could not be coerced; a default was used.
    UnparsableValue,
    /// An optional table has no column for a role and was skipped.
    ColumnNotFound,
    /// A base-population row had no identifier and was skipped.
    MissingIdentifier,
    /// A base-population key appeared more than once; the first row was kept.
    DuplicateEmployee,
}

/// A warning generated during a run.
///
/// Warnings never stop the run; they are attached to the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    /// What kind of problem this is.
    pub code: WarningCode,
    /// The table the problem was found in.
    pub table: String,
    /// A human-readable description.
    pub message: String,
}

impl RunWarning {
    /// Creates a new warning.
    pub fn new(code: WarningCode, table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            table: table.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.table, self.message)
    }
}

/// The computed benefit of a single employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitRecord {
    /// The employee this benefit is for.
    pub employee: EmployeeRecord,
    /// Working days used for the period.
    pub working_days: u32,
    /// Where `working_days` came from.
    pub days_source: DaysSource,
    /// The daily rate applied.
    pub daily_rate: Decimal,
    /// Which lookup tier produced `daily_rate`.
    pub rate_source: RateSource,
    /// `daily_rate * working_days`.
    pub total: Decimal,
    /// The employer's share of `total`.
    pub employer_cost: Decimal,
    /// The employee's share of `total`.
    pub employee_discount: Decimal,
    /// Admission date from the admissions source, if any.
    pub admission_date: Option<NaiveDate>,
    /// The competence period label.
    pub competence_period: String,
    /// Observation flags, in rendering order.
    pub observations: Vec<Observation>,
    /// Audit trail of the decisions behind this record.
    pub audit_steps: Vec<AuditStep>,
}

impl BenefitRecord {
    /// Renders the observation flags joined with `"; "`, or `"OK"` when none apply.
    ///
    /// # Example
    ///
    /// ```
    /// use benefit_engine::models::{BenefitRecord, DaysSource, EmployeeRecord, Observation, RateSource};
    /// use rust_decimal::Decimal;
    ///
    /// let mut record = BenefitRecord {
    ///     employee: EmployeeRecord::new("1", "UNKNOWN"),
    ///     working_days: 22,
    ///     days_source: DaysSource::Default,
    ///     daily_rate: Decimal::ZERO,
    ///     rate_source: RateSource::Unresolved,
    ///     total: Decimal::ZERO,
    ///     employer_cost: Decimal::ZERO,
    ///     employee_discount: Decimal::ZERO,
    ///     admission_date: None,
    ///     competence_period: "05/2025".to_string(),
    ///     observations: vec![Observation::ZeroValueRate, Observation::DefaultWorkingDays(22)],
    ///     audit_steps: vec![],
    /// };
    /// assert_eq!(
    ///     record.observation(),
    ///     "zero value — check union; standard working days (22)"
    /// );
    ///
    /// record.observations.clear();
    /// assert_eq!(record.observation(), "OK");
    /// ```
    pub fn observation(&self) -> String {
        if self.observations.is_empty() {
            return "OK".to_string();
        }
        self.observations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// How many keys one exclusion source contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionContribution {
    /// The source name (e.g. "interns").
    pub source: String,
    /// The identifier column used, or `None` when none resolved.
    pub column: Option<String>,
    /// Number of distinct keys the source held.
    pub keys: usize,
}

/// The complete result of a benefit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The competence period the run represents.
    pub competence_period: String,
    /// One record per surviving employee, in base-population order.
    pub records: Vec<BenefitRecord>,
    /// Per-source exclusion contributions.
    pub exclusions: Vec<ExclusionContribution>,
    /// Number of base-population employees removed by the exclusion set.
    pub excluded_employees: usize,
    /// Recoverable problems found during the run.
    pub warnings: Vec<RunWarning>,
    /// The run duration in microseconds.
    pub duration_us: u64,
}

impl CalculationResult {
    /// Looks up the record of one employee.
    pub fn record(&self, key: &EmployeeKey) -> Option<&BenefitRecord> {
        self.records.iter().find(|r| &r.employee.key == key)
    }

    /// Returns true when no employee key appears twice.
    pub fn has_unique_keys(&self) -> bool {
        let mut seen = HashSet::new();
        self.records.iter().all(|r| seen.insert(&r.employee.key))
    }
}
