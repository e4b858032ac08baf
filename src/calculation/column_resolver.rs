//! Heuristic column discovery.
//!
//! Source tables arrive without a fixed schema. This module locates the
//! column playing a semantic role (identifier, rate, day-count, ...) from
//! naming conventions alone: each role declares an ordered list of name
//! fragments, compared case-insensitively as substrings of the headers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Table;

/// The semantic role a column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// The employee registration number.
    Identifier,
    /// The daily benefit value of a union.
    Rate,
    /// The number of working days.
    DayCount,
    /// The employee's display name.
    Name,
    /// The employee's job title.
    JobTitle,
    /// The union / collective-bargaining group.
    Group,
    /// The employment situation text.
    Situation,
    /// The admission date.
    AdmissionDate,
}

impl ColumnRole {
    /// Candidate fragments in priority order. The first fragment that matches
    /// any header wins, regardless of where that header sits.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Identifier => &[
                "MATRÍCULA",
                "MATRICULA",
                "MAT",
                "CODIGO",
                "ID",
                "CPF",
                "FUNCIONARIO",
                "COLABORADOR",
                "REGISTRATION",
                "EMPLOYEE",
            ],
            ColumnRole::Rate => &["VALOR_VR", "VALOR", "VR", "VALOR_REF", "REFEICAO", "RATE"],
            ColumnRole::DayCount => &[
                "DIAS_UTEIS",
                "DIAS",
                "DIAS_TRABALHADOS",
                "WORKING_DAYS",
                "DAYS",
            ],
            ColumnRole::Name => &["NOME", "NAME"],
            ColumnRole::JobTitle => &["CARGO", "TITULO", "TITLE", "ROLE"],
            ColumnRole::Group => &["SINDICATO", "SINDIC", "UNION", "GROUP"],
            ColumnRole::Situation => &["DESC. SITUACAO", "SITUACAO", "SITUAÇÃO", "STATUS"],
            ColumnRole::AdmissionDate => &[
                "ADMISSAO",
                "ADMISSÃO",
                "DATA",
                "INICIO",
                "ENTRADA",
                "ADMISSION",
                "START",
            ],
        }
    }

    /// Lower-case label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ColumnRole::Identifier => "identifier",
            ColumnRole::Rate => "rate",
            ColumnRole::DayCount => "day-count",
            ColumnRole::Name => "name",
            ColumnRole::JobTitle => "job title",
            ColumnRole::Group => "group",
            ColumnRole::Situation => "situation",
            ColumnRole::AdmissionDate => "admission date",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fragments that disqualify a header from the identifier shape heuristic.
pub const IDENTIFIER_DENYLIST: &[&str] = &[
    "VALOR", "VALUE", "DIAS", "DAYS", "BASE", "SINDICATO", "UNION", "CARGO", "ROLE", "NOME",
    "NAME",
];

/// Finds the header playing `role`.
///
/// Candidates are tried in priority order; for each candidate the first
/// header (in source order) containing it is returned. When nothing matches
/// and `role` is [`ColumnRole::Identifier`], the shortest header that has no
/// digits and no [`IDENTIFIER_DENYLIST`] fragment is chosen instead. Other
/// roles report `None`.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::{resolve_column, ColumnRole};
///
/// let headers = vec!["NOME".to_string(), "MATRICULA".to_string(), "Sindicato".to_string()];
/// assert_eq!(resolve_column(&headers, ColumnRole::Identifier), Some("MATRICULA"));
/// assert_eq!(resolve_column(&headers, ColumnRole::Group), Some("Sindicato"));
/// assert_eq!(resolve_column(&headers, ColumnRole::Rate), None);
/// ```
pub fn resolve_column(headers: &[String], role: ColumnRole) -> Option<&str> {
    resolve_index(headers, role).map(|idx| headers[idx].as_str())
}

/// Like [`resolve_column`], returning the column position.
pub fn resolve_index(headers: &[String], role: ColumnRole) -> Option<usize> {
    let upper: Vec<String> = headers.iter().map(|h| h.to_uppercase()).collect();

    let by_name = role
        .candidates()
        .iter()
        .find_map(|candidate| upper.iter().position(|h| h.contains(candidate)));

    if by_name.is_some() || role != ColumnRole::Identifier {
        return by_name;
    }

    upper
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.chars().any(|c| c.is_ascii_digit()))
        .filter(|(_, h)| !IDENTIFIER_DENYLIST.iter().any(|word| h.contains(word)))
        .min_by_key(|(_, h)| h.chars().count())
        .map(|(idx, _)| idx)
}

/// Resolves `role` against a table's headers.
pub fn resolve_in_table(table: &Table, role: ColumnRole) -> Option<usize> {
    resolve_index(&table.headers, role)
}
