//! Core data models for the benefit engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod employee;
mod table;

pub use calculation_result::{
    AuditStep, BenefitRecord, CalculationResult, DaysSource, ExclusionContribution, Observation,
    RateSource, RunWarning, WarningCode,
};
pub use employee::{EmployeeKey, EmployeeRecord, Situation};
pub use table::{Cell, Table};
