//! Exclusion set construction.
//!
//! Interns, apprentices, employees on leave of absence and employees on an
//! overseas assignment do not receive the benefit. Each of those sources is a
//! table of registration numbers; this module unions them into a single
//! [`ExclusionSet`].

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::{EmployeeKey, ExclusionContribution, Table};

use super::column_resolver::{ColumnRole, resolve_in_table};

/// The set of employee keys that must not receive the benefit in a run.
///
/// The set only grows: keys are added by union and never removed.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    keys: HashSet<EmployeeKey>,
    contributions: Vec<ExclusionContribution>,
}

impl ExclusionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `key` is excluded.
    pub fn contains(&self, key: &EmployeeKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of distinct excluded keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates the excluded keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &EmployeeKey> {
        self.keys.iter()
    }

    /// What each source contributed, in the order sources were added.
    pub fn contributions(&self) -> &[ExclusionContribution] {
        &self.contributions
    }

    /// Adds keys on behalf of a named source.
    pub fn extend<I>(&mut self, source: &str, column: Option<String>, keys: I)
    where
        I: IntoIterator<Item = EmployeeKey>,
    {
        let distinct: HashSet<EmployeeKey> = keys.into_iter().collect();
        debug!(source, keys = distinct.len(), "Adding exclusion keys");
        self.contributions.push(ExclusionContribution {
            source: source.to_string(),
            column,
            keys: distinct.len(),
        });
        self.keys.extend(distinct);
    }

    /// Adds every non-missing identifier of `table`.
    ///
    /// Returns the identifier column used, or `None` when the table has no
    /// identifier column; such a table contributes nothing.
    pub fn extend_from_table(&mut self, source: &str, table: &Table) -> Option<String> {
        let Some(column) = resolve_in_table(table, ColumnRole::Identifier) else {
            info!(
                source,
                columns = ?table.headers,
                "No identifier column in exclusion source, skipping"
            );
            self.contributions.push(ExclusionContribution {
                source: source.to_string(),
                column: None,
                keys: 0,
            });
            return None;
        };

        let keys = table
            .column_cells(column)
            .filter_map(|cell| cell.to_text())
            .map(EmployeeKey::new);
        let header = table.headers[column].clone();
        self.extend(source, Some(header.clone()), keys);
        Some(header)
    }
}

/// Builds the exclusion set from named disqualification tables.
///
/// Sources whose identifier column cannot be resolved are skipped; the union
/// is best-effort and never fails.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::build_exclusion_set;
/// use benefit_engine::models::{Cell, EmployeeKey, Table};
///
/// let interns = Table::new("interns", ["MATRICULA"]).with_row(vec![Cell::from("1001")]);
/// let overseas = Table::new("overseas", ["Cadastro"]).with_row(vec![Cell::from(1002.0)]);
///
/// let set = build_exclusion_set([("interns", &interns), ("overseas", &overseas)]);
/// assert!(set.contains(&EmployeeKey::new("1001")));
/// assert!(set.contains(&EmployeeKey::new("1002")));
/// assert_eq!(set.len(), 2);
/// ```
pub fn build_exclusion_set<'a, I>(sources: I) -> ExclusionSet
where
    I: IntoIterator<Item = (&'a str, &'a Table)>,
{
    let mut set = ExclusionSet::new();
    for (source, table) in sources {
        set.extend_from_table(source, table);
    }
    info!(excluded = set.len(), "Built exclusion set");
    set
}
