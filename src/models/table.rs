//! Uniform tabular datasets.
//!
//! Every source the engine consumes arrives as a [`Table`]: a list of header
//! names and rows of loosely-typed [`Cell`]s. No column order is assumed;
//! columns are located by name through the column resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of a source table.
///
/// Cells keep the shape the source gave them: spreadsheets and JSON carry
/// numbers, CSV exports carry text. Coercion happens at the point of use.
///
/// # Example
///
/// ```
/// use benefit_engine::models::Cell;
///
/// let cells: Vec<Cell> = serde_json::from_str(r#"[null, "R$ 37,50", 1234]"#).unwrap();
/// assert_eq!(cells[0], Cell::Empty);
/// assert_eq!(cells[1], Cell::Text("R$ 37,50".to_string()));
/// assert_eq!(cells[2], Cell::Number(1234.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// No value.
    Empty,
    /// A textual value, as typed into the source.
    Text(String),
    /// A numeric value.
    Number(f64),
}

impl Cell {
    /// Returns true when the cell holds no usable value (empty or blank text).
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// Returns the cell as trimmed text, or `None` when it is missing.
    ///
    /// Whole numbers render without a fractional part, so an identifier typed
    /// as `123` in one source and `123.0` in another yields the same text.
    pub fn to_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Cell::Empty => None,
            Cell::Text(text) => Some(text.trim().to_string()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Cell::Number(n) => Some(n.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Number(_) => write!(f, "{}", self.to_text().unwrap_or_default()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// A named table of loosely-typed cells.
///
/// Rows shorter than the header list are padded with [`Cell::Empty`] on read.
///
/// # Example
///
/// ```
/// use benefit_engine::models::{Cell, Table};
///
/// let table = Table::new("union_rates", ["SINDICATO", "VALOR"])
///     .with_row(vec![Cell::from("SINDPD SP"), Cell::from(37.5)]);
///
/// assert_eq!(table.column_index("VALOR"), Some(1));
/// assert_eq!(table.cell(0, 1), &Cell::Number(37.5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// The dataset name, used in diagnostics.
    #[serde(default)]
    pub name: String,
    /// Column names in source order.
    pub headers: Vec<String>,
    /// Data rows.
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given headers.
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, builder style.
    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// The cell at `(row, column)`; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Iterates the cells of one column, top to bottom.
    pub fn column_cells(&self, column: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&EMPTY_CELL))
    }
}
