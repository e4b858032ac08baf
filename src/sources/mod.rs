//! Source datasets.
//!
//! A run consumes up to ten named tables. They arrive either as JSON (the
//! HTTP API deserializes a [`SourceBundle`] directly) or as a directory of
//! CSV exports read with [`load_csv_dir`].

mod bundle;
mod csv_loader;
mod kind;

pub use bundle::SourceBundle;
pub use csv_loader::{load_csv_dir, load_csv_file, parse_csv};
pub use kind::SourceKind;
