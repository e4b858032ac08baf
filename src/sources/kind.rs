//! The named datasets a run consumes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the ten source datasets of a benefit run.
///
/// JSON payloads use the snake_case names; the Portuguese export names
/// (`ATIVOS`, `FERIAS`, ...) are accepted as aliases.
///
/// # Example
///
/// ```
/// use benefit_engine::sources::SourceKind;
///
/// let kind: SourceKind = serde_json::from_str("\"union_rates\"").unwrap();
/// assert_eq!(kind, SourceKind::UnionRates);
///
/// let kind: SourceKind = serde_json::from_str("\"ATIVOS\"").unwrap();
/// assert_eq!(kind, SourceKind::ActiveEmployees);
/// assert_eq!(kind.file_stem(), "ATIVOS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The base population.
    #[serde(alias = "ATIVOS")]
    ActiveEmployees,
    /// Employees on vacation during the period.
    #[serde(alias = "FERIAS")]
    Vacations,
    /// Employees terminated during the period.
    #[serde(alias = "DESLIGADOS")]
    Terminations,
    /// Employees admitted during the period.
    #[serde(alias = "ADMISSAO")]
    Admissions,
    /// Union name to daily rate.
    #[serde(alias = "SINDICATO_VALOR")]
    UnionRates,
    /// Working days of the period.
    #[serde(alias = "DIAS_UTEIS")]
    WorkingDays,
    /// Employees on leave of absence.
    #[serde(alias = "AFASTAMENTOS")]
    LeaveOfAbsence,
    /// Employees on an overseas assignment.
    #[serde(alias = "EXTERIOR")]
    Overseas,
    /// Interns.
    #[serde(alias = "ESTAGIO")]
    Interns,
    /// Apprentices.
    #[serde(alias = "APRENDIZ")]
    Apprentices,
}

impl SourceKind {
    /// Every kind, in pipeline order.
    pub const ALL: [SourceKind; 10] = [
        SourceKind::ActiveEmployees,
        SourceKind::Vacations,
        SourceKind::Terminations,
        SourceKind::Admissions,
        SourceKind::UnionRates,
        SourceKind::WorkingDays,
        SourceKind::LeaveOfAbsence,
        SourceKind::Overseas,
        SourceKind::Interns,
        SourceKind::Apprentices,
    ];

    /// The sources whose members never receive the benefit.
    pub const EXCLUSIONS: [SourceKind; 4] = [
        SourceKind::Interns,
        SourceKind::Apprentices,
        SourceKind::LeaveOfAbsence,
        SourceKind::Overseas,
    ];

    /// The snake_case name, used as the table name in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::ActiveEmployees => "active_employees",
            SourceKind::Vacations => "vacations",
            SourceKind::Terminations => "terminations",
            SourceKind::Admissions => "admissions",
            SourceKind::UnionRates => "union_rates",
            SourceKind::WorkingDays => "working_days",
            SourceKind::LeaveOfAbsence => "leave_of_absence",
            SourceKind::Overseas => "overseas",
            SourceKind::Interns => "interns",
            SourceKind::Apprentices => "apprentices",
        }
    }

    /// The file stem of the CSV export holding this dataset.
    pub fn file_stem(self) -> &'static str {
        match self {
            SourceKind::ActiveEmployees => "ATIVOS",
            SourceKind::Vacations => "FERIAS",
            SourceKind::Terminations => "DESLIGADOS",
            SourceKind::Admissions => "ADMISSAO",
            SourceKind::UnionRates => "SINDICATO_VALOR",
            SourceKind::WorkingDays => "DIAS_UTEIS",
            SourceKind::LeaveOfAbsence => "AFASTAMENTOS",
            SourceKind::Overseas => "EXTERIOR",
            SourceKind::Interns => "ESTAGIO",
            SourceKind::Apprentices => "APRENDIZ",
        }
    }

    /// Finds the kind whose file stem equals `stem`, ignoring case.
    pub fn from_file_stem(stem: &str) -> Option<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.file_stem().eq_ignore_ascii_case(stem.trim()))
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
