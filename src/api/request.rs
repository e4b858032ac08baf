//! Request types for the benefit engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use serde::{Deserialize, Serialize};

use crate::sources::SourceBundle;

/// Request body for the `/calculate` endpoint.
///
/// Carries the source tables of one run, keyed by dataset name. Only
/// `active_employees` and `union_rates` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The source tables.
    pub sources: SourceBundle,
}
