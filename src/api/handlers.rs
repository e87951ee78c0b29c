//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PayrollError;
use crate::services::NewPayrollRun;

use super::request::{
    ApproveRunRequest, AttendanceCalculationRequest, ProcessRunRequest, TodayStatsQuery,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll-runs", post(create_run_handler))
        .route("/payroll-runs/:id", get(get_run_handler))
        .route("/payroll-runs/:id/details", get(run_details_handler))
        .route("/payroll-runs/:id/submit", post(submit_run_handler))
        .route("/payroll-runs/:id/approve", post(approve_run_handler))
        .route("/payroll-runs/:id/process", post(process_run_handler))
        .route("/payroll-runs/:id/pay", post(pay_run_handler))
        .route("/payroll-runs/:id/cancel", post(cancel_run_handler))
        .route(
            "/payslips/:employee_id/:year/:month",
            get(payslip_handler),
        )
        .route("/attendance/calculate", post(attendance_calculate_handler))
        .route("/attendance/today-stats", get(today_stats_handler))
        .route("/tax/:employee_id/:year/monthly", get(monthly_tax_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Logs a service failure and converts it to its HTTP form.
fn error_response(correlation_id: Uuid, error: PayrollError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        kind = ?error.kind(),
        "Request failed"
    );
    ApiErrorResponse::from(error).into_response()
}

/// Converts a JSON body rejection into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /payroll-runs.
async fn create_run_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewPayrollRun>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        month = request.month,
        year = request.year,
        "Creating payroll run"
    );

    match state.payroll().create_run(request, Utc::now()).await {
        Ok(run) => json_response(StatusCode::CREATED, run),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /payroll-runs/:id.
async fn get_run_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.payroll().get_run(id).await {
        Ok(Some(run)) => json_response(StatusCode::OK, run),
        Ok(None) => ApiErrorResponse::not_found("payroll run", id).into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /payroll-runs/:id/details.
async fn run_details_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.payroll().details_for_run(id).await {
        Ok(details) => json_response(StatusCode::OK, details),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll-runs/:id/submit.
async fn submit_run_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, run_id = id, "Submitting payroll run");
    match state.payroll().submit(id).await {
        Ok(run) => json_response(StatusCode::OK, run),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll-runs/:id/approve.
async fn approve_run_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ApproveRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        run_id = id,
        approver_id = request.approver_id,
        "Approving payroll run"
    );
    match state
        .payroll()
        .approve(id, request.approver_id, Utc::now())
        .await
    {
        Ok(run) => json_response(StatusCode::OK, run),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll-runs/:id/process.
async fn process_run_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ProcessRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        run_id = id,
        processed_by = request.processed_by,
        "Processing payroll run"
    );
    match state
        .payroll()
        .process(id, request.processed_by, Utc::now())
        .await
    {
        Ok(run) => {
            info!(
                correlation_id = %correlation_id,
                run_id = id,
                employees = run.totals.total_employees,
                net = %run.totals.total_net_salary,
                "Payroll run processed"
            );
            json_response(StatusCode::OK, run)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll-runs/:id/pay.
async fn pay_run_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, run_id = id, "Marking payroll run paid");
    match state.payroll().mark_paid(id).await {
        Ok(run) => json_response(StatusCode::OK, run),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll-runs/:id/cancel.
async fn cancel_run_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, run_id = id, "Cancelling payroll run");
    match state.payroll().cancel(id).await {
        Ok(run) => json_response(StatusCode::OK, run),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /payslips/:employee_id/:year/:month.
async fn payslip_handler(
    State(state): State<AppState>,
    Path((employee_id, year, month)): Path<(i64, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.payroll().payslip(employee_id, month, year).await {
        Ok(Some(payslip)) => json_response(StatusCode::OK, payslip),
        Ok(None) => ApiErrorResponse::not_found(
            "payslip",
            format!("employee {} for {}-{:02}", employee_id, year, month),
        )
        .into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /attendance/calculate.
async fn attendance_calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceCalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match state
        .attendance()
        .calculate(request.employee_id, request.start_date, request.end_date)
        .await
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = request.employee_id,
                working_days = result.working_days,
                paid_days = result.paid_days,
                "Attendance calculated"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /attendance/today-stats?date=YYYY-MM-DD.
async fn today_stats_handler(
    State(state): State<AppState>,
    query: Result<Query<TodayStatsQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let date = match query {
        Ok(Query(query)) => query.date,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Bad query string");
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            );
        }
    };

    match state.attendance().daily_stats(date).await {
        Ok(stats) => json_response(StatusCode::OK, stats),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /tax/:employee_id/:year/monthly.
async fn monthly_tax_handler(
    State(state): State<AppState>,
    Path((employee_id, year)): Path<(i64, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.tax().annual_tax(employee_id, year).await {
        Ok(breakdown) => {
            info!(
                correlation_id = %correlation_id,
                employee_id,
                year,
                monthly_tax = %breakdown.monthly_tax,
                "Tax calculated"
            );
            json_response(StatusCode::OK, breakdown)
        }
        Err(err) => error_response(correlation_id, err),
    }
}
