//! Rate table construction and tiered rate resolution.
//!
//! The union rate source maps a union (group) name to a daily benefit value.
//! Group names in the base population rarely match it exactly, so the
//! [`RateTable`] also carries two ordered fallback tables (union-name
//! keywords and region codes) consulted when the exact lookup yields zero.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::{FallbackConfig, FallbackEntry};
use crate::error::{EngineError, EngineResult};
use crate::models::{RateSource, RunWarning, Table, WarningCode};

use super::column_resolver::{ColumnRole, resolve_in_table};
use super::numeric::{NumericToken, normalize_numeric_token};

/// Group name to daily rate, plus keyword and region fallbacks.
///
/// Immutable once built; shared read-only by every per-employee calculation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    exact: HashMap<String, Decimal>,
    keywords: Vec<FallbackEntry>,
    regions: Vec<FallbackEntry>,
}

/// A resolved daily rate and the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateResolution {
    /// The daily rate; zero when unresolved.
    pub rate: Decimal,
    /// The tier that produced `rate`.
    pub source: RateSource,
}

impl RateTable {
    /// Creates a rate table from an exact mapping and fallback tables.
    pub fn new(exact: HashMap<String, Decimal>, fallbacks: FallbackConfig) -> Self {
        Self {
            exact,
            keywords: fallbacks.keywords,
            regions: fallbacks.regions,
        }
    }

    /// The exact group-name mapping.
    pub fn exact(&self) -> &HashMap<String, Decimal> {
        &self.exact
    }

    /// The keyword fallbacks, in declaration order.
    pub fn keywords(&self) -> &[FallbackEntry] {
        &self.keywords
    }

    /// The region fallbacks, in declaration order.
    pub fn regions(&self) -> &[FallbackEntry] {
        &self.regions
    }

    /// Resolves the daily rate for a group name.
    ///
    /// Tiers are evaluated in a fixed order and the first non-zero result
    /// wins:
    /// 1. exact match of `group` in the rate source
    /// 2. the first keyword fallback whose fragment `group` contains
    /// 3. the first region fallback whose code `group` contains
    ///
    /// Fallback matching is a case-insensitive substring test. When every
    /// tier yields zero the rate is zero and the source is
    /// [`RateSource::Unresolved`].
    ///
    /// # Examples
    ///
    /// ```
    /// use benefit_engine::calculation::RateTable;
    /// use benefit_engine::config::{FallbackConfig, FallbackEntry};
    /// use benefit_engine::models::RateSource;
    /// use rust_decimal::Decimal;
    /// use std::collections::HashMap;
    ///
    /// let fallbacks = FallbackConfig {
    ///     keywords: vec![FallbackEntry::new("SINDPD SP", Decimal::new(375, 1))],
    ///     regions: vec![FallbackEntry::new("RJ", Decimal::from(35))],
    /// };
    /// let table = RateTable::new(HashMap::new(), fallbacks);
    ///
    /// let resolved = table.resolve("SINDPD SP - SAO PAULO");
    /// assert_eq!(resolved.rate, Decimal::new(375, 1));
    ///
    /// let resolved = table.resolve("sitepd rj");
    /// assert_eq!(resolved.source, RateSource::Region { fragment: "RJ".to_string() });
    ///
    /// let resolved = table.resolve("UNKNOWN");
    /// assert_eq!(resolved.rate, Decimal::ZERO);
    /// assert_eq!(resolved.source, RateSource::Unresolved);
    /// ```
    pub fn resolve(&self, group: &str) -> RateResolution {
        if let Some(rate) = self.exact.get(group).copied().filter(|r| !r.is_zero()) {
            return RateResolution {
                rate,
                source: RateSource::Exact,
            };
        }

        let upper = group.to_uppercase();

        if let Some(entry) = first_fragment_match(&self.keywords, &upper) {
            if !entry.rate.is_zero() {
                return RateResolution {
                    rate: entry.rate,
                    source: RateSource::Keyword {
                        fragment: entry.fragment.clone(),
                    },
                };
            }
        }

        if let Some(entry) = first_fragment_match(&self.regions, &upper) {
            if !entry.rate.is_zero() {
                return RateResolution {
                    rate: entry.rate,
                    source: RateSource::Region {
                        fragment: entry.fragment.clone(),
                    },
                };
            }
        }

        RateResolution {
            rate: Decimal::ZERO,
            source: RateSource::Unresolved,
        }
    }
}

fn first_fragment_match<'a>(entries: &'a [FallbackEntry], upper: &str) -> Option<&'a FallbackEntry> {
    entries
        .iter()
        .find(|entry| upper.contains(&entry.fragment.to_uppercase()))
}

/// The result of building a rate table.
#[derive(Debug, Clone)]
pub struct RateTableBuild {
    /// The built rate table.
    pub rate_table: RateTable,
    /// Rows whose value had to be defaulted to zero.
    pub warnings: Vec<RunWarning>,
}

/// Builds a [`RateTable`] from the union rate source.
///
/// The first column holds the group name; the value column is located with
/// the column resolver. Values are coerced with
/// [`normalize_numeric_token`]; an unusable value, or one above `max_rate`,
/// maps its group to zero and records a warning. Rows without a group name
/// are skipped. When a group appears twice, the later row wins.
///
/// # Errors
///
/// Returns [`EngineError::MissingColumn`] when the table has no columns or
/// no rate column can be resolved.
pub fn build_rate_table(
    table: &Table,
    fallbacks: &FallbackConfig,
    max_rate: Decimal,
) -> EngineResult<RateTableBuild> {
    let missing_rate_column = || EngineError::MissingColumn {
        table: table.name.clone(),
        role: ColumnRole::Rate.label().to_string(),
        available: table.headers.clone(),
    };

    if table.headers.is_empty() {
        return Err(missing_rate_column());
    }
    let rate_column = resolve_in_table(table, ColumnRole::Rate).ok_or_else(missing_rate_column)?;
    let group_column = 0;

    let mut exact = HashMap::new();
    let mut warnings = Vec::new();

    for row in 0..table.len() {
        let Some(group) = table.cell(row, group_column).to_text() else {
            continue;
        };

        let token = match normalize_numeric_token(table.cell(row, rate_column), Decimal::ZERO) {
            NumericToken::Parsed(rate) if rate > max_rate => NumericToken::Defaulted {
                value: Decimal::ZERO,
                reason: format!("{} exceeds the maximum daily rate {}", rate, max_rate),
            },
            token => token,
        };

        let rate = match token {
            NumericToken::Parsed(rate) => rate,
            NumericToken::Defaulted { value, reason } => {
                warn!(table = %table.name, group = %group, reason = %reason, "Rate defaulted to zero");
                warnings.push(RunWarning::new(
                    WarningCode::UnparsableValue,
                    table.name.clone(),
                    format!("rate for group '{}' defaulted to {}: {}", group, value, reason),
                ));
                value
            }
        };

        exact.insert(group, rate);
    }

    info!(
        table = %table.name,
        group_column = %table.headers[group_column],
        rate_column = %table.headers[rate_column],
        groups = exact.len(),
        defaulted = warnings.len(),
        "Built rate table"
    );

    Ok(RateTableBuild {
        rate_table: RateTable::new(exact, fallbacks.clone()),
        warnings,
    })
}
