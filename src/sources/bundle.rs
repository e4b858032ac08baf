//! The set of tables supplied to one run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::Table;

use super::kind::SourceKind;

/// Tables keyed by the dataset they represent.
///
/// Each table is named after its kind, so diagnostics always point at the
/// dataset. Kinds that were not supplied are simply absent.
///
/// # Example
///
/// ```
/// use benefit_engine::sources::{SourceBundle, SourceKind};
///
/// let json = r#"{
///     "active_employees": { "headers": ["MATRICULA"], "rows": [["1001"]] },
///     "SINDICATO_VALOR": { "headers": ["SINDICATO", "VALOR"], "rows": [] }
/// }"#;
/// let bundle: SourceBundle = serde_json::from_str(json).unwrap();
///
/// assert_eq!(bundle.len(), 2);
/// assert_eq!(bundle.get(SourceKind::UnionRates).unwrap().name, "union_rates");
/// assert!(bundle.get(SourceKind::Interns).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<SourceKind, Table>", into = "BTreeMap<SourceKind, Table>")]
pub struct SourceBundle {
    tables: BTreeMap<SourceKind, Table>,
}

impl SourceBundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table, renaming it after `kind`.
    pub fn insert(&mut self, kind: SourceKind, mut table: Table) -> Option<Table> {
        table.name = kind.as_str().to_string();
        self.tables.insert(kind, table)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, kind: SourceKind, table: Table) -> Self {
        self.insert(kind, table);
        self
    }

    /// The table for `kind`, if supplied.
    pub fn get(&self, kind: SourceKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    /// The table for `kind`, failing when it was not supplied.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SourceUnavailable`] when `kind` is absent.
    pub fn require(&self, kind: SourceKind) -> EngineResult<&Table> {
        self.get(kind).ok_or_else(|| EngineError::SourceUnavailable {
            table: kind.as_str().to_string(),
            reason: "the dataset was not supplied".to_string(),
        })
    }

    /// The supplied kinds, in pipeline order.
    pub fn kinds(&self) -> impl Iterator<Item = SourceKind> + '_ {
        self.tables.keys().copied()
    }

    /// Number of supplied tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true when no table was supplied.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl From<BTreeMap<SourceKind, Table>> for SourceBundle {
    fn from(tables: BTreeMap<SourceKind, Table>) -> Self {
        tables
            .into_iter()
            .fold(SourceBundle::new(), |bundle, (kind, table)| bundle.with(kind, table))
    }
}

impl From<SourceBundle> for BTreeMap<SourceKind, Table> {
    fn from(bundle: SourceBundle) -> Self {
        bundle.tables
    }
}
