//! Loading source tables from CSV exports.
//!
//! A source directory holds one CSV file per dataset, named after
//! [`SourceKind::file_stem`] (`ATIVOS.csv`, `SINDICATO_VALOR.csv`, ...).
//! Files for datasets that are not needed may be left out.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{Cell, Table};

use super::bundle::SourceBundle;
use super::kind::SourceKind;

const UTF8_BOM: char = '\u{feff}';

/// Picks `;` when the header line has more semicolons than commas.
///
/// Spreadsheets configured for a decimal comma export with `;`.
fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Parses CSV text into a table.
///
/// The first record is the header row. Fields are kept as text, so
/// coercion happens where the value is used; empty fields become
/// [`Cell::Empty`].
///
/// # Example
///
/// ```
/// use benefit_engine::models::Cell;
/// use benefit_engine::sources::parse_csv;
///
/// let table = parse_csv("union_rates", "SINDICATO;VALOR\nSINDPD SP;\"R$ 37,50\"\n").unwrap();
/// assert_eq!(table.headers, vec!["SINDICATO", "VALOR"]);
/// assert_eq!(table.cell(0, 1), &Cell::from("R$ 37,50"));
/// ```
pub fn parse_csv(name: &str, content: &str) -> EngineResult<Table> {
    let content = content.trim_start_matches(UTF8_BOM);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| EngineError::SourceParseError {
            path: name.to_string(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut table = Table::new(name, headers);
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| EngineError::SourceParseError {
            path: name.to_string(),
            message: format!("row {}: {}", row_idx + 1, e),
        })?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(Cell::from).collect());
    }

    Ok(table)
}

/// Reads one CSV file into a table.
///
/// # Errors
///
/// Returns [`EngineError::SourceParseError`] when the file cannot be read
/// or is not valid CSV.
pub fn load_csv_file<P: AsRef<Path>>(path: P, name: &str) -> EngineResult<Table> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| EngineError::SourceParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    parse_csv(name, &content).map_err(|e| match e {
        EngineError::SourceParseError { message, .. } => EngineError::SourceParseError {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })
}

/// Loads every recognised CSV file of a directory into a bundle.
///
/// Files are matched to kinds by stem, ignoring case; other files are
/// ignored. Missing datasets are absent from the bundle.
///
/// # Errors
///
/// Returns [`EngineError::SourceParseError`] when the directory cannot be
/// listed or a recognised file cannot be parsed.
pub fn load_csv_dir<P: AsRef<Path>>(dir: P) -> EngineResult<SourceBundle> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| EngineError::SourceParseError {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    let mut bundle = SourceBundle::new();
    for path in paths {
        let Some(kind) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(SourceKind::from_file_stem)
        else {
            debug!(path = %path.display(), "Ignoring unrecognised CSV file");
            continue;
        };
        if bundle.get(kind).is_some() {
            debug!(path = %path.display(), kind = %kind, "Dataset already loaded, ignoring file");
            continue;
        }

        let table = load_csv_file(&path, kind.as_str())?;
        debug!(kind = %kind, rows = table.len(), "Loaded source file");
        bundle.insert(kind, table);
    }

    info!(
        dir = %dir.display(),
        datasets = bundle.len(),
        "Loaded source directory"
    );
    Ok(bundle)
}
