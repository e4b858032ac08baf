//! The benefit run pipeline.
//!
//! A run goes through fixed stages over immutable values:
//!
//! 1. build the base population (annotated with vacations and terminations)
//! 2. build the exclusion set from the disqualifying sources and the
//!    configured labels
//! 3. build the rate table
//! 4. resolve the working days
//! 5. build the admission index
//! 6. drop excluded employees and calculate every survivor
//!
//! No stage performs I/O; the sources are already in memory.

use std::time::Instant;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::config::BenefitConfig;
use crate::error::EngineResult;
use crate::models::{BenefitRecord, CalculationResult};
use crate::sources::{SourceBundle, SourceKind};

use super::admission::build_admission_index;
use super::benefit::{BenefitContext, calculate_benefit};
use super::exclusion::ExclusionSet;
use super::population::{build_population, match_excluded_labels};
use super::rate_table::build_rate_table;
use super::working_days::resolve_working_days;

/// The source name under which configured-label exclusions are recorded.
pub const CONFIGURED_LABELS_SOURCE: &str = "configured_labels";

/// The crate version stamped on every result.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the benefit calculation over a bundle of sources.
///
/// # Errors
///
/// - `SourceUnavailable` when the active-employees source is missing or
///   empty, or the union-rates source is missing
/// - `MissingColumn` when the active-employees source has no identifier
///   column or the union-rates source has no rate column
///
/// Every other problem is recovered and reported in
/// [`CalculationResult::warnings`].
///
/// # Example
///
/// ```
/// use benefit_engine::calculation::run_benefit;
/// use benefit_engine::config::BenefitConfig;
/// use benefit_engine::models::{Cell, Table};
/// use benefit_engine::sources::{SourceBundle, SourceKind};
///
/// let sources = SourceBundle::new()
///     .with(
///         SourceKind::ActiveEmployees,
///         Table::new("", ["MATRICULA", "SINDICATO"])
///             .with_row(vec![Cell::from("1"), Cell::from("SINDPD SP")]),
///     )
///     .with(
///         SourceKind::UnionRates,
///         Table::new("", ["SINDICATO", "VALOR"])
///             .with_row(vec![Cell::from("SINDPD SP"), Cell::from("37,50")]),
///     )
///     .with(
///         SourceKind::WorkingDays,
///         Table::new("", ["DIAS_UTEIS"]).with_row(vec![Cell::from(20.0)]),
///     );
///
/// let result = run_benefit(&sources, &BenefitConfig::default())?;
/// assert_eq!(result.records.len(), 1);
/// assert_eq!(result.records[0].total.to_string(), "750");
/// # Ok::<(), benefit_engine::error::EngineError>(())
/// ```
pub fn run_benefit(sources: &SourceBundle, config: &BenefitConfig) -> EngineResult<CalculationResult> {
    let start = Instant::now();
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, datasets = sources.len(), "Starting benefit run");

    let active = sources.require(SourceKind::ActiveEmployees)?;
    let rates = sources.require(SourceKind::UnionRates)?;

    let population = build_population(
        active,
        sources.get(SourceKind::Vacations),
        sources.get(SourceKind::Terminations),
    )?;
    let mut warnings = population.warnings;

    let mut exclusions = ExclusionSet::new();
    for kind in SourceKind::EXCLUSIONS {
        if let Some(table) = sources.get(kind) {
            exclusions.extend_from_table(kind.as_str(), table);
        }
    }
    exclusions.extend(
        CONFIGURED_LABELS_SOURCE,
        None,
        match_excluded_labels(&population.employees, config.exclusions()),
    );
    info!(run_id = %run_id, excluded_keys = exclusions.len(), "Built exclusion set");

    let rate_build = build_rate_table(
        rates,
        config.fallbacks(),
        config.calculation().max_daily_rate,
    )?;
    warnings.extend(rate_build.warnings);

    let days = resolve_working_days(sources.get(SourceKind::WorkingDays), config.calculation());
    warnings.extend(days.warning);

    let admissions = build_admission_index(sources.get(SourceKind::Admissions));
    warnings.extend(admissions.warnings);

    let ctx = BenefitContext {
        rate_table: &rate_build.rate_table,
        working_days: days.working_days,
        admissions: &admissions.index,
        config,
    };

    let records: Vec<BenefitRecord> = population
        .employees
        .iter()
        .filter(|employee| !exclusions.contains(&employee.key))
        .map(|employee| calculate_benefit(employee, &ctx))
        .collect::<EngineResult<_>>()?;
    let excluded_employees = population.employees.len() - records.len();

    let duration_us = start.elapsed().as_micros() as u64;
    info!(
        run_id = %run_id,
        employees = population.employees.len(),
        calculated = records.len(),
        excluded = excluded_employees,
        warnings = warnings.len(),
        duration_us,
        "Benefit run complete"
    );

    Ok(CalculationResult {
        run_id,
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        competence_period: config.calculation().competence_period.clone(),
        records,
        exclusions: exclusions.contributions().to_vec(),
        excluded_employees,
        warnings,
        duration_us,
    })
}
