//! HTTP API module for the payroll engine.
//!
//! This module exposes payroll runs, payslips, attendance reconciliation and
//! tax calculation as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ApproveRunRequest, AttendanceCalculationRequest, ProcessRunRequest, TodayStatsQuery,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
