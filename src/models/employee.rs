//! Employee model and related types.
//!
//! This module defines the [`EmployeeRecord`] built from the base population
//! and the [`Situation`] enum describing whether the employee is working,
//! on leave or terminated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The stable identifier of an employee within a run (the registration number).
///
/// Keys are opaque text; numeric source cells are rendered to their canonical
/// integer form before becoming keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeKey(String);

impl EmployeeKey {
    /// Creates a key from any text.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The employment situation of an employee for the competence period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    /// Working normally.
    #[default]
    Active,
    /// On vacation during the period.
    OnLeave,
    /// Terminated during the period.
    Terminated,
}

impl Situation {
    /// Classifies a free-text situation label from the base population.
    ///
    /// # Examples
    ///
    /// ```
    /// use benefit_engine::models::Situation;
    ///
    /// assert_eq!(Situation::from_label("Férias"), Situation::OnLeave);
    /// assert_eq!(Situation::from_label("Desligado"), Situation::Terminated);
    /// assert_eq!(Situation::from_label("Trabalhando"), Situation::Active);
    /// ```
    pub fn from_label(label: &str) -> Self {
        let upper = label.to_uppercase();
        if ["DESLIGADO", "TERMINATED"]
            .iter()
            .any(|fragment| upper.contains(fragment))
        {
            Situation::Terminated
        } else if ["FÉRIAS", "FERIAS", "VACATION", "LEAVE"]
            .iter()
            .any(|fragment| upper.contains(fragment))
        {
            Situation::OnLeave
        } else {
            Situation::Active
        }
    }

    /// Combines two observations of the same employee, keeping the stronger one.
    ///
    /// Terminated outranks on leave, which outranks active.
    pub fn merge(self, other: Situation) -> Situation {
        match (self, other) {
            (Situation::Terminated, _) | (_, Situation::Terminated) => Situation::Terminated,
            (Situation::OnLeave, _) | (_, Situation::OnLeave) => Situation::OnLeave,
            _ => Situation::Active,
        }
    }
}

/// An employee of the base population, before any benefit is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique key for the employee within the run.
    pub key: EmployeeKey,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Job title (role).
    #[serde(default)]
    pub job_title: String,
    /// Union / collective-bargaining group name, the primary rate-lookup key.
    #[serde(default)]
    pub group: String,
    /// The raw situation label, when the source carries one.
    #[serde(default)]
    pub situation_label: Option<String>,
    /// The employment situation.
    #[serde(default)]
    pub situation: Situation,
}

impl EmployeeRecord {
    /// Creates an active employee with the given key and group.
    pub fn new(key: impl Into<EmployeeKey>, group: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: String::new(),
            job_title: String::new(),
            group: group.into(),
            situation_label: None,
            situation: Situation::Active,
        }
    }
}

impl From<String> for EmployeeKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
