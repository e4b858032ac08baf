//! Per-employee benefit calculation.
//!
//! This module turns one surviving employee into a [`BenefitRecord`]: it
//! resolves the daily rate through the rate table tiers, applies the run's
//! working days, splits the total between employer and employee, and
//! collects the observation flags. Every decision is recorded as an
//! [`AuditStep`].

use rust_decimal::Decimal;

use crate::config::BenefitConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, BenefitRecord, EmployeeRecord, Observation, RateSource, Situation,
};

use super::admission::AdmissionIndex;
use super::rate_table::{RateResolution, RateTable};
use super::working_days::WorkingDays;

/// The shared, read-only inputs of every per-employee calculation in a run.
#[derive(Debug, Clone, Copy)]
pub struct BenefitContext<'a> {
    /// The union rate table with its fallbacks.
    pub rate_table: &'a RateTable,
    /// The run's working days.
    pub working_days: WorkingDays,
    /// Employees admitted during the period.
    pub admissions: &'a AdmissionIndex,
    /// The validated configuration.
    pub config: &'a BenefitConfig,
}

/// The result of splitting a total between employer and employee.
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// `rate * days`.
    pub total: Decimal,
    /// The employer's share of the total.
    pub employer_cost: Decimal,
    /// The employee's share, `total - employer_cost`.
    pub employee_discount: Decimal,
    /// The audit step recording this split.
    pub audit_step: AuditStep,
}

/// Computes the total benefit and splits it between employer and employee.
///
/// The employee discount is the remainder of the total after the employer
/// cost, so both parts always add up to the total exactly.
///
/// # Errors
///
/// Returns [`EngineError::AmountOverflow`] when the total or the employer
/// cost exceeds the decimal range.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::split_benefit;
/// use rust_decimal::Decimal;
///
/// let split = split_benefit(
///     Decimal::new(375, 1),
///     20,
///     Decimal::new(8, 1),
///     1,
/// )?;
/// assert_eq!(split.total, Decimal::from(750));
/// assert_eq!(split.employer_cost, Decimal::from(600));
/// assert_eq!(split.employee_discount, Decimal::from(150));
/// # Ok::<(), benefit_engine::error::EngineError>(())
/// ```
pub fn split_benefit(
    daily_rate: Decimal,
    working_days: u32,
    employer_share: Decimal,
    step_number: u32,
) -> EngineResult<SplitResult> {
    let total = daily_rate
        .checked_mul(Decimal::from(working_days))
        .ok_or_else(|| EngineError::AmountOverflow {
            context: format!("total of {} x {} days", daily_rate, working_days),
        })?
        .normalize();
    let employer_cost = total
        .checked_mul(employer_share)
        .ok_or_else(|| EngineError::AmountOverflow {
            context: format!("employer cost of {} at {}", total, employer_share),
        })?
        .normalize();
    let employee_discount = (total - employer_cost).normalize();

    let audit_step = AuditStep {
        step_number,
        rule_id: "benefit_split".to_string(),
        rule_name: "Employer/Employee Split".to_string(),
        input: serde_json::json!({
            "daily_rate": daily_rate.to_string(),
            "working_days": working_days,
            "employer_share": employer_share.to_string()
        }),
        output: serde_json::json!({
            "total": total.to_string(),
            "employer_cost": employer_cost.to_string(),
            "employee_discount": employee_discount.to_string()
        }),
        reasoning: format!(
            "{} x {} days = {}; employer pays {} ({}), employee discount {}",
            daily_rate, working_days, total, employer_cost, employer_share, employee_discount
        ),
    };

    Ok(SplitResult {
        total,
        employer_cost,
        employee_discount,
        audit_step,
    })
}

fn rate_audit_step(group: &str, resolution: &RateResolution, step_number: u32) -> AuditStep {
    let (tier, fragment) = match &resolution.source {
        RateSource::Exact => ("exact", None),
        RateSource::Keyword { fragment } => ("keyword", Some(fragment.as_str())),
        RateSource::Region { fragment } => ("region", Some(fragment.as_str())),
        RateSource::Unresolved => ("unresolved", None),
    };

    let reasoning = match fragment {
        Some(fragment) => format!(
            "Group '{}' has no exact rate; {} fallback '{}' gives {}",
            group, tier, fragment, resolution.rate
        ),
        None if tier == "exact" => format!("Group '{}' has exact rate {}", group, resolution.rate),
        None => format!("No rate tier matched group '{}'; rate is zero", group),
    };

    AuditStep {
        step_number,
        rule_id: "rate_resolution".to_string(),
        rule_name: "Daily Rate Resolution".to_string(),
        input: serde_json::json!({ "group": group }),
        output: serde_json::json!({
            "rate": resolution.rate.to_string(),
            "tier": tier,
            "fragment": fragment
        }),
        reasoning,
    }
}

fn working_days_audit_step(working_days: WorkingDays, step_number: u32) -> AuditStep {
    let source = if working_days.is_default() {
        "default"
    } else {
        "source"
    };
    AuditStep {
        step_number,
        rule_id: "working_days".to_string(),
        rule_name: "Working Days".to_string(),
        input: serde_json::json!({ "source": source }),
        output: serde_json::json!({ "days": working_days.days }),
        reasoning: if working_days.is_default() {
            format!(
                "Working-days source unusable; standard {} days applied",
                working_days.days
            )
        } else {
            format!("{} working days read from source", working_days.days)
        },
    }
}

/// Calculates the benefit of one employee.
///
/// Steps, in order:
/// 1. resolve the daily rate for the employee's group
/// 2. take the run's working days
/// 3. compute the total and the employer/employee split
///
/// Observation flags are attached in their fixed rendering order: recent
/// admission, zero-value rate, default working days, on leave, terminated.
/// The recent-admission flag requires a usable admission date, so it never
/// appears next to an `N/A` admission field.
///
/// # Errors
///
/// Returns [`EngineError::AmountOverflow`] from [`split_benefit`].
pub fn calculate_benefit(
    employee: &EmployeeRecord,
    ctx: &BenefitContext<'_>,
) -> EngineResult<BenefitRecord> {
    let resolution = ctx.rate_table.resolve(employee.group.trim());
    let rate_step = rate_audit_step(&employee.group, &resolution, 1);
    let days_step = working_days_audit_step(ctx.working_days, 2);
    let split = split_benefit(
        resolution.rate,
        ctx.working_days.days,
        ctx.config.employer_share(),
        3,
    )?;

    let admission_date = ctx.admissions.date(&employee.key);
    let mut observations = Vec::new();
    if admission_date.is_some() {
        observations.push(Observation::RecentAdmission);
    }
    if resolution.source == RateSource::Unresolved {
        observations.push(Observation::ZeroValueRate);
    }
    if ctx.working_days.is_default() {
        observations.push(Observation::DefaultWorkingDays(ctx.working_days.days));
    }
    match employee.situation {
        Situation::OnLeave => observations.push(Observation::OnLeave),
        Situation::Terminated => observations.push(Observation::Terminated),
        Situation::Active => {}
    }

    Ok(BenefitRecord {
        employee: employee.clone(),
        working_days: ctx.working_days.days,
        days_source: ctx.working_days.source,
        daily_rate: resolution.rate,
        rate_source: resolution.source,
        total: split.total,
        employer_cost: split.employer_cost,
        employee_discount: split.employee_discount,
        admission_date,
        competence_period: ctx.config.calculation().competence_period.clone(),
        observations,
        audit_steps: vec![rate_step, days_step, split.audit_step],
    })
}
