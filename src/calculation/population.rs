//! Base population construction.
//!
//! The active-employees source defines who is considered for the benefit.
//! Vacation and termination sources only annotate that population, and the
//! configured exclusion labels select further employees to drop.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::ExclusionLabels;
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeKey, EmployeeRecord, RunWarning, Situation, Table, WarningCode};

use super::column_resolver::{ColumnRole, resolve_in_table};

/// The base population of a run.
#[derive(Debug, Clone, Default)]
pub struct Population {
    /// Employees in source order, keys unique.
    pub employees: Vec<EmployeeRecord>,
    /// Rows that were skipped or annotations that could not be applied.
    pub warnings: Vec<RunWarning>,
}

/// Builds the base population from the active-employees source.
///
/// Rows without an identifier are skipped, and a repeated key keeps its
/// first row; both are reported as warnings. Name, job title, group and
/// situation columns are optional. Employees listed in `vacations` are
/// marked on leave and those in `terminations` terminated, on top of what
/// the situation column says.
///
/// # Errors
///
/// Returns [`EngineError::SourceUnavailable`] when `active` has no rows and
/// [`EngineError::MissingColumn`] when it has no identifier column.
pub fn build_population(
    active: &Table,
    vacations: Option<&Table>,
    terminations: Option<&Table>,
) -> EngineResult<Population> {
    if active.is_empty() {
        return Err(EngineError::SourceUnavailable {
            table: active.name.clone(),
            reason: "the table has no rows".to_string(),
        });
    }

    let id_col =
        resolve_in_table(active, ColumnRole::Identifier).ok_or_else(|| EngineError::MissingColumn {
            table: active.name.clone(),
            role: ColumnRole::Identifier.label().to_string(),
            available: active.headers.clone(),
        })?;
    let name_col = resolve_in_table(active, ColumnRole::Name);
    let title_col = resolve_in_table(active, ColumnRole::JobTitle);
    let group_col = resolve_in_table(active, ColumnRole::Group);
    let situation_col = resolve_in_table(active, ColumnRole::Situation);

    let mut population = Population::default();

    if group_col.is_none() {
        let message = "no group column, every employee falls back to an unresolved rate".to_string();
        warn!(table = %active.name, "{}", message);
        population.warnings.push(RunWarning::new(
            WarningCode::ColumnNotFound,
            active.name.clone(),
            message,
        ));
    }

    let on_leave = membership(vacations, &mut population.warnings);
    let terminated = membership(terminations, &mut population.warnings);

    let text_at = |row: usize, col: Option<usize>| {
        col.and_then(|c| active.cell(row, c).to_text())
    };

    let mut seen = HashSet::new();
    for row in 0..active.len() {
        let Some(key) = text_at(row, Some(id_col)).map(EmployeeKey::new) else {
            let message = format!("row {} has no identifier, skipped", row + 1);
            warn!(table = %active.name, "{}", message);
            population.warnings.push(RunWarning::new(
                WarningCode::MissingIdentifier,
                active.name.clone(),
                message,
            ));
            continue;
        };

        if !seen.insert(key.clone()) {
            let message = format!("employee {} appears again at row {}, kept the first", key, row + 1);
            warn!(table = %active.name, "{}", message);
            population.warnings.push(RunWarning::new(
                WarningCode::DuplicateEmployee,
                active.name.clone(),
                message,
            ));
            continue;
        }

        let situation_label = text_at(row, situation_col);
        let mut situation = situation_label
            .as_deref()
            .map(Situation::from_label)
            .unwrap_or_default();
        if on_leave.contains(&key) {
            situation = situation.merge(Situation::OnLeave);
        }
        if terminated.contains(&key) {
            situation = situation.merge(Situation::Terminated);
        }

        population.employees.push(EmployeeRecord {
            name: text_at(row, name_col).unwrap_or_default(),
            job_title: text_at(row, title_col).unwrap_or_default(),
            group: text_at(row, group_col).unwrap_or_default(),
            situation_label,
            situation,
            key,
        });
    }

    info!(
        table = %active.name,
        employees = population.employees.len(),
        skipped = population.warnings.len(),
        "Built base population"
    );

    Ok(population)
}

fn membership(table: Option<&Table>, warnings: &mut Vec<RunWarning>) -> HashSet<EmployeeKey> {
    let Some(table) = table else {
        return HashSet::new();
    };

    match resolve_in_table(table, ColumnRole::Identifier) {
        Some(col) => table
            .column_cells(col)
            .filter_map(|cell| cell.to_text())
            .map(EmployeeKey::new)
            .collect(),
        None => {
            let message = format!(
                "no identifier column among [{}], situation not applied",
                table.headers.join(", ")
            );
            warn!(table = %table.name, "{}", message);
            warnings.push(RunWarning::new(
                WarningCode::ColumnNotFound,
                table.name.clone(),
                message,
            ));
            HashSet::new()
        }
    }
}

/// Selects the employees matched by the configured exclusion labels.
///
/// Role and type labels are tested against the job title, status labels
/// against the situation text. Matching is a case-insensitive substring test.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::match_excluded_labels;
/// use benefit_engine::config::ExclusionLabels;
/// use benefit_engine::models::{EmployeeKey, EmployeeRecord};
///
/// let mut director = EmployeeRecord::new("1", "SINDPD SP");
/// director.job_title = "Diretor Comercial".to_string();
/// let analyst = EmployeeRecord::new("2", "SINDPD SP");
///
/// let keys = match_excluded_labels(&[director, analyst], &ExclusionLabels::default());
/// assert_eq!(keys, vec![EmployeeKey::new("1")]);
/// ```
pub fn match_excluded_labels(
    employees: &[EmployeeRecord],
    labels: &ExclusionLabels,
) -> Vec<EmployeeKey> {
    let upper = |items: &[String]| -> Vec<String> {
        items
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    };
    let title_labels: Vec<String> = upper(&labels.excluded_roles)
        .into_iter()
        .chain(upper(&labels.excluded_types))
        .collect();
    let status_labels = upper(&labels.excluded_statuses);

    employees
        .iter()
        .filter(|employee| {
            let title = employee.job_title.to_uppercase();
            let status = employee
                .situation_label
                .as_deref()
                .unwrap_or_default()
                .to_uppercase();
            let matched = title_labels.iter().any(|l| title.contains(l.as_str()))
                || status_labels.iter().any(|l| status.contains(l.as_str()));
            if matched {
                debug!(key = %employee.key, title = %employee.job_title, "Matched exclusion label");
            }
            matched
        })
        .map(|employee| employee.key.clone())
        .collect()
}
