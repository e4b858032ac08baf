//! HTTP API module for the benefit engine.
//!
//! This module exposes the benefit run over REST: `POST /calculate` takes
//! the source tables as JSON and returns the assembled report, and
//! `GET /health` reports the loaded configuration.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, ApiErrorResponse, HealthResponse};
pub use state::AppState;
