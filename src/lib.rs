//! Meal/food voucher (VR/VA) benefit engine.
//!
//! This crate consolidates the personnel datasets of a competence period
//! into one monthly benefit per employee: it unions the exclusion sources,
//! resolves each employee's daily rate from the union rate table with
//! keyword and region fallbacks, and splits the total between employer and
//! employee.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod sources;
