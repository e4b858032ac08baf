//! Calculation logic for the benefit engine.
//!
//! This module contains the stages of a benefit run: heuristic column
//! resolution, numeric coercion, exclusion set construction, rate table
//! construction with tiered fallbacks, working-days and admission lookups,
//! base population construction, the per-employee calculation, and the
//! pipeline tying them together.

mod admission;
mod benefit;
mod column_resolver;
mod exclusion;
mod numeric;
mod pipeline;
mod population;
mod rate_table;
mod working_days;

pub use admission::{AdmissionIndex, AdmissionIndexBuild, build_admission_index, parse_admission_date};
pub use benefit::{BenefitContext, SplitResult, calculate_benefit, split_benefit};
pub use column_resolver::{
    ColumnRole, IDENTIFIER_DENYLIST, resolve_column, resolve_in_table, resolve_index,
};
pub use exclusion::{ExclusionSet, build_exclusion_set};
pub use numeric::{CURRENCY_MARKER, NumericToken, normalize_numeric_token};
pub use pipeline::{CONFIGURED_LABELS_SOURCE, ENGINE_VERSION, run_benefit};
pub use population::{Population, build_population, match_excluded_labels};
pub use rate_table::{RateResolution, RateTable, RateTableBuild, build_rate_table};
pub use working_days::{WorkingDays, WorkingDaysResolution, parse_day_count, resolve_working_days};
