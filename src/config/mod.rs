//! Configuration loading and management for the benefit engine.
//!
//! This module loads the calculation settings, exclusion labels and fallback
//! rate tables from YAML files and validates them eagerly, so an inconsistent
//! configuration stops the process at startup instead of skewing a run.
//!
//! # Example
//!
//! ```no_run
//! use benefit_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/vr_va").unwrap();
//! println!("Employer share: {}", loader.config().employer_share());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BenefitConfig, CalculationSettings, ExclusionLabels, FallbackConfig, FallbackEntry,
};
