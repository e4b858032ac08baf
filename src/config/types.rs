//! Configuration types for benefit calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, plus the validated
//! [`BenefitConfig`] aggregate the engine consumes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_max_daily_rate() -> Decimal {
    Decimal::from(10_000)
}

/// Calculation settings from `calculation.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSettings {
    /// Share of the benefit paid by the employer, in percent (e.g. 80).
    pub employer_percentage: Decimal,
    /// Share of the benefit discounted from the employee, in percent (e.g. 20).
    pub employee_percentage: Decimal,
    /// Working days used when the working-days source is missing or unusable.
    pub default_working_days: u32,
    /// Smallest acceptable working-days value.
    pub min_working_days: u32,
    /// Largest acceptable working-days value.
    pub max_working_days: u32,
    /// The competence period label stamped on every record (e.g. "05/2025").
    pub competence_period: String,
    /// `chrono` format used to render admission dates in the report.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Largest daily rate accepted from the rate source; larger values are defaulted.
    #[serde(default = "default_max_daily_rate")]
    pub max_daily_rate: Decimal,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            employer_percentage: Decimal::from(80),
            employee_percentage: Decimal::from(20),
            default_working_days: 22,
            min_working_days: 1,
            max_working_days: 31,
            competence_period: "05/2025".to_string(),
            date_format: default_date_format(),
            max_daily_rate: default_max_daily_rate(),
        }
    }
}

/// Labels that exclude an employee from the benefit, from `exclusions.yaml`.
///
/// Matching is a case-insensitive substring test against the employee's
/// job title (roles and types) or situation text (statuses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionLabels {
    /// Job titles that never receive the benefit (directors, executives).
    #[serde(default)]
    pub excluded_roles: Vec<String>,
    /// Employee types that never receive the benefit (interns, apprentices).
    #[serde(default)]
    pub excluded_types: Vec<String>,
    /// Situation labels that suspend the benefit (leave, overseas).
    #[serde(default)]
    pub excluded_statuses: Vec<String>,
}

impl Default for ExclusionLabels {
    fn default() -> Self {
        let labels = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            excluded_roles: labels(&[
                "DIRETOR",
                "DIRETORA",
                "PRESIDENTE",
                "VICE-PRESIDENTE",
                "CEO",
                "CFO",
                "CTO",
            ]),
            excluded_types: labels(&["ESTAGIARIO", "ESTAGIARIA", "APRENDIZ", "APRENDIZA"]),
            excluded_statuses: labels(&[
                "AFASTADO",
                "LICENCA",
                "MATERNIDADE",
                "PATERNIDADE",
                "EXTERIOR",
            ]),
        }
    }
}

/// A fallback association between a naming fragment and a daily rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackEntry {
    /// The fragment searched for inside the group name.
    pub fragment: String,
    /// The daily rate applied when the fragment matches.
    pub rate: Decimal,
}

impl FallbackEntry {
    /// Creates a new fallback entry.
    pub fn new(fragment: impl Into<String>, rate: Decimal) -> Self {
        Self {
            fragment: fragment.into(),
            rate,
        }
    }
}

/// Ordered fallback tables from `fallbacks.yaml`.
///
/// Declaration order matters: the first matching entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Union-name fragments (e.g. "SINDPD SP").
    #[serde(default)]
    pub keywords: Vec<FallbackEntry>,
    /// Region codes (e.g. "SP").
    #[serde(default)]
    pub regions: Vec<FallbackEntry>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        let sp = Decimal::new(3750, 2);
        let other = Decimal::new(3500, 2);
        Self {
            keywords: vec![
                FallbackEntry::new("SINDPD SP", sp),
                FallbackEntry::new("SINDPPD RS", other),
                FallbackEntry::new("SINDPPD RJ", other),
                FallbackEntry::new("SINDPPD PR", other),
                FallbackEntry::new("SINDPPD SP", sp),
            ],
            regions: vec![
                FallbackEntry::new("SP", sp),
                FallbackEntry::new("RS", other),
                FallbackEntry::new("RJ", other),
                FallbackEntry::new("PR", other),
            ],
        }
    }
}

/// The complete, validated benefit configuration.
///
/// Built once at startup and treated as immutable for every run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenefitConfig {
    calculation: CalculationSettings,
    exclusions: ExclusionLabels,
    fallbacks: FallbackConfig,
}

impl BenefitConfig {
    /// Creates a configuration from its parts, validating it eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationError`] when the percentages do not
    /// sum to 100, a percentage or fallback rate is negative, the working-day
    /// bounds are inverted, the default day-count lies outside the bounds, the
    /// maximum daily rate is not positive, or a fallback entry has a blank
    /// fragment or a rate above the maximum.
    pub fn new(
        calculation: CalculationSettings,
        exclusions: ExclusionLabels,
        fallbacks: FallbackConfig,
    ) -> EngineResult<Self> {
        validate_calculation(&calculation)?;
        validate_fallbacks(&fallbacks, calculation.max_daily_rate)?;
        Ok(Self {
            calculation,
            exclusions,
            fallbacks,
        })
    }

    /// Returns the calculation settings.
    pub fn calculation(&self) -> &CalculationSettings {
        &self.calculation
    }

    /// Returns the exclusion labels.
    pub fn exclusions(&self) -> &ExclusionLabels {
        &self.exclusions
    }

    /// Returns the fallback tables.
    pub fn fallbacks(&self) -> &FallbackConfig {
        &self.fallbacks
    }

    /// The employer share as a fraction of one (80% -> 0.8).
    pub fn employer_share(&self) -> Decimal {
        self.calculation.employer_percentage / ONE_HUNDRED
    }

    /// The employee share as a fraction of one (20% -> 0.2).
    pub fn employee_share(&self) -> Decimal {
        self.calculation.employee_percentage / ONE_HUNDRED
    }
}

impl Default for BenefitConfig {
    fn default() -> Self {
        Self {
            calculation: CalculationSettings::default(),
            exclusions: ExclusionLabels::default(),
            fallbacks: FallbackConfig::default(),
        }
    }
}

fn validate_calculation(settings: &CalculationSettings) -> EngineResult<()> {
    let employer = settings.employer_percentage;
    let employee = settings.employee_percentage;

    if employer.is_sign_negative() || employee.is_sign_negative() {
        return Err(EngineError::ConfigurationError {
            message: format!(
                "percentages must not be negative (employer {}%, employee {}%)",
                employer, employee
            ),
        });
    }

    if employer + employee != ONE_HUNDRED {
        return Err(EngineError::ConfigurationError {
            message: format!(
                "percentages must sum to 100 (got {}% + {}%)",
                employer, employee
            ),
        });
    }

    if settings.min_working_days >= settings.max_working_days {
        return Err(EngineError::ConfigurationError {
            message: format!(
                "min_working_days must be less than max_working_days (got {} >= {})",
                settings.min_working_days, settings.max_working_days
            ),
        });
    }

    if settings.max_daily_rate <= Decimal::ZERO {
        return Err(EngineError::ConfigurationError {
            message: format!(
                "max_daily_rate must be positive (got {})",
                settings.max_daily_rate
            ),
        });
    }

    let bounds = settings.min_working_days..=settings.max_working_days;
    if !bounds.contains(&settings.default_working_days) {
        return Err(EngineError::ConfigurationError {
            message: format!(
                "default_working_days {} is outside {}..={}",
                settings.default_working_days,
                settings.min_working_days,
                settings.max_working_days
            ),
        });
    }

    Ok(())
}

fn validate_fallbacks(fallbacks: &FallbackConfig, max_rate: Decimal) -> EngineResult<()> {
    for entry in fallbacks.keywords.iter().chain(&fallbacks.regions) {
        if entry.fragment.trim().is_empty() {
            return Err(EngineError::ConfigurationError {
                message: format!(
                    "fallback fragment must not be blank (rate {})",
                    entry.rate
                ),
            });
        }
        if entry.rate.is_sign_negative() && !entry.rate.is_zero() {
            return Err(EngineError::ConfigurationError {
                message: format!(
                    "fallback rate for '{}' must not be negative (got {})",
                    entry.fragment, entry.rate
                ),
            });
        }
        if entry.rate > max_rate {
            return Err(EngineError::ConfigurationError {
                message: format!(
                    "fallback rate for '{}' exceeds max_daily_rate {} (got {})",
                    entry.fragment, max_rate, entry.rate
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn settings_with_shares(employer: &str, employee: &str) -> CalculationSettings {
        CalculationSettings {
            employer_percentage: dec(employer),
            employee_percentage: dec(employee),
            ..CalculationSettings::default()
        }
    }

    #[test]
    fn test_default_config_shares() {
        let config = BenefitConfig::default();
        assert_eq!(config.employer_share(), dec("0.8"));
        assert_eq!(config.employee_share(), dec("0.2"));
        assert_eq!(config.employer_share() + config.employee_share(), Decimal::ONE);
    }

    #[test]
    fn test_default_config_passes_validation() {
        let result = BenefitConfig::new(
            CalculationSettings::default(),
            ExclusionLabels::default(),
            FallbackConfig::default(),
        );
        assert_eq!(result.unwrap(), BenefitConfig::default());
    }

    #[test]
    fn test_shares_not_summing_to_100_rejected() {
        let result = BenefitConfig::new(
            settings_with_shares("80", "30"),
            ExclusionLabels::default(),
            FallbackConfig::default(),
        );

        match result {
            Err(EngineError::ConfigurationError { message }) => {
                assert!(message.contains("sum to 100"), "{}", message);
            }
            other => panic!("Expected ConfigurationError, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_shares_accepted() {
        let config = BenefitConfig::new(
            settings_with_shares("72.5", "27.5"),
            ExclusionLabels::default(),
            FallbackConfig::default(),
        )
        .unwrap();
        assert_eq!(config.employer_share(), dec("0.725"));
        assert_eq!(config.employee_share(), dec("0.275"));
    }

    #[test]
    fn test_negative_share_rejected() {
        let result = BenefitConfig::new(
            settings_with_shares("120", "-20"),
            ExclusionLabels::default(),
            FallbackConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_inverted_day_bounds_rejected() {
        let settings = CalculationSettings {
            min_working_days: 31,
            max_working_days: 1,
            ..CalculationSettings::default()
        };
        let result = BenefitConfig::new(
            settings,
            ExclusionLabels::default(),
            FallbackConfig::default(),
        );

        match result {
            Err(EngineError::ConfigurationError { message }) => {
                assert!(message.contains("min_working_days"), "{}", message);
            }
            other => panic!("Expected ConfigurationError, got {:?}", other),
        }
    }

    #[test]
    fn test_default_days_outside_bounds_rejected() {
        let settings = CalculationSettings {
            default_working_days: 40,
            ..CalculationSettings::default()
        };
        let result = BenefitConfig::new(
            settings,
            ExclusionLabels::default(),
            FallbackConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_negative_fallback_rate_rejected() {
        let fallbacks = FallbackConfig {
            keywords: vec![FallbackEntry::new("SINDPD SP", dec("-1"))],
            regions: vec![],
        };
        let result = BenefitConfig::new(
            CalculationSettings::default(),
            ExclusionLabels::default(),
            fallbacks,
        );
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_default_fallbacks_declared_in_order() {
        let fallbacks = FallbackConfig::default();
        let fragments: Vec<&str> = fallbacks
            .keywords
            .iter()
            .map(|e| e.fragment.as_str())
            .collect();
        assert_eq!(
            fragments,
            vec!["SINDPD SP", "SINDPPD RS", "SINDPPD RJ", "SINDPPD PR", "SINDPPD SP"]
        );
        assert_eq!(fallbacks.regions[0], FallbackEntry::new("SP", dec("37.50")));
    }

    #[test]
    fn test_calculation_settings_date_format_defaults() {
        let yaml = r#"
employer_percentage: 80
employee_percentage: 20
default_working_days: 22
min_working_days: 1
max_working_days: 31
competence_period: "05/2025"
"#;
        let settings: CalculationSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.date_format, "%d/%m/%Y");
        assert_eq!(settings, CalculationSettings::default());
    }

    fn config_with_fallbacks(keywords: Vec<FallbackEntry>) -> EngineResult<BenefitConfig> {
        BenefitConfig::new(
            CalculationSettings::default(),
            ExclusionLabels::default(),
            FallbackConfig {
                keywords,
                regions: vec![FallbackEntry::new("SP", dec("37.50"))],
            },
        )
    }

    #[test]
    fn test_blank_fallback_fragment_rejected() {
        for fragment in ["", "   "] {
            match config_with_fallbacks(vec![FallbackEntry::new(fragment, dec("35"))]) {
                Err(EngineError::ConfigurationError { message }) => {
                    assert!(message.contains("blank"), "{}", message)
                }
                other => panic!("Expected ConfigurationError, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_fallback_rate_above_maximum_rejected() {
        let result = config_with_fallbacks(vec![FallbackEntry::new("SINDPD SP", dec("10000.01"))]);
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationError { .. })
        ));

        let result = config_with_fallbacks(vec![FallbackEntry::new("SINDPD SP", dec("10000"))]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_positive_max_daily_rate_rejected() {
        let settings = CalculationSettings {
            max_daily_rate: Decimal::ZERO,
            ..CalculationSettings::default()
        };
        let result = BenefitConfig::new(settings, ExclusionLabels::default(), FallbackConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationError { .. })
        ));
    }
}
