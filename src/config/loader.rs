//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading benefit
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{BenefitConfig, CalculationSettings, ExclusionLabels, FallbackConfig};

/// Loads and provides access to the benefit configuration.
///
/// # Directory Structure
///
/// ```text
/// config/vr_va/
/// ├── calculation.yaml   # Percentages, working days, competence period
/// ├── exclusions.yaml    # Excluded role/type/status labels
/// └── fallbacks.yaml     # Keyword and region fallback rates
/// ```
///
/// `exclusions.yaml` and `fallbacks.yaml` are optional; the built-in
/// defaults apply when they are absent. `calculation.yaml` is required.
///
/// # Example
///
/// ```no_run
/// use benefit_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/vr_va")?;
/// println!("Competence: {}", loader.config().calculation().competence_period);
/// # Ok::<(), benefit_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: BenefitConfig,
}

impl ConfigLoader {
    /// Loads and validates configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// - `ConfigNotFound` when `calculation.yaml` is missing
    /// - `ConfigParseError` when any present file is not valid YAML for its type
    /// - `ConfigurationError` when the loaded values are inconsistent
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let calculation = Self::load_yaml::<CalculationSettings>(&path.join("calculation.yaml"))?;
        let exclusions =
            Self::load_optional_yaml::<ExclusionLabels>(&path.join("exclusions.yaml"))?
                .unwrap_or_default();
        let fallbacks = Self::load_optional_yaml::<FallbackConfig>(&path.join("fallbacks.yaml"))?
            .unwrap_or_default();

        let config = BenefitConfig::new(calculation, exclusions, fallbacks)?;

        info!(
            path = %path.display(),
            competence = %config.calculation().competence_period,
            keyword_fallbacks = config.fallbacks().keywords.len(),
            region_fallbacks = config.fallbacks().regions.len(),
            "Loaded benefit configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: BenefitConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads a YAML file that may legitimately be absent.
    fn load_optional_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_yaml(path).map(Some)
    }

    /// Returns the underlying benefit configuration.
    pub fn config(&self) -> &BenefitConfig {
        &self.config
    }
}
