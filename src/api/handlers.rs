//! HTTP request handlers for the Leave Entitlement Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::TransitionOptions;
use crate::store::LeaveRequestFilter;

use super::request::{
    AccrualRunBody, BalancesQuery, CreateLeaveBody, DeleteLeaveQuery, ForfeitureProcessBody,
    ListLeavesQuery, TransitionBody, UpdateLeaveBody,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/leaves", post(create_leave).get(list_leaves))
        .route("/leaves/validate", post(validate_leave))
        .route(
            "/leaves/:id",
            get(get_leave).patch(update_leave).delete(delete_leave),
        )
        .route("/leaves/:id/transition", post(transition_leave))
        .route("/employees/:id/balances", get(employee_balances))
        .route("/employees/:id/summary", get(employee_summary))
        .route("/employees/:id/forfeiture", get(forfeiture_preview))
        .route("/employees/:id/forfeiture/process", post(process_forfeiture))
        .route("/accrual/run", post(run_accrual))
        .route("/holidays/:year", get(list_holidays))
        .with_state(state)
}

fn bad_json(rejection: JsonRejection, correlation_id: Uuid) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {err}"))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /leaves.
async fn create_leave(
    State(state): State<AppState>,
    payload: Result<Json<CreateLeaveBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Json(body) = payload.map_err(|rejection| bad_json(rejection, correlation_id))?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %body.employee_id,
        "processing leave request creation"
    );

    let request = state
        .service()
        .create_leave_request(body.into())
        .map_err(|e| {
            warn!(correlation_id = %correlation_id, error = %e, "leave creation refused");
            ApiErrorResponse::from(e)
        })?;

    Ok((
        StatusCode::CREATED,
        [(header::CONTENT_TYPE, "application/json")],
        Json(request),
    ))
}

/// Handler for POST /leaves/validate (UI preflight).
async fn validate_leave(
    State(state): State<AppState>,
    payload: Result<Json<CreateLeaveBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Json(body) = payload.map_err(|rejection| bad_json(rejection, correlation_id))?;

    let outcome = state
        .service()
        .validate_leave_request(&body.into())
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(outcome))
}

/// Handler for GET /leaves.
async fn list_leaves(
    State(state): State<AppState>,
    Query(query): Query<ListLeavesQuery>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let filter: LeaveRequestFilter = query.into();
    let requests = state
        .service()
        .get_leave_requests(&filter)
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(requests))
}

/// Handler for GET /leaves/{id}.
async fn get_leave(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let request = state
        .service()
        .get_leave_request(request_id)
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(request))
}

/// Handler for PATCH /leaves/{id} (pending requests only).
async fn update_leave(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    payload: Result<Json<UpdateLeaveBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Json(body) = payload.map_err(|rejection| bad_json(rejection, correlation_id))?;

    let changes = crate::service::UpdateLeaveRequest {
        start_date: body.start_date,
        end_date: body.end_date,
        half_day: body.half_day,
        half_day_period: body.half_day_period,
        reason: body.reason,
    };
    let request = state
        .service()
        .update_leave_request(request_id, body.actor_id, changes)
        .map_err(|e| {
            warn!(correlation_id = %correlation_id, error = %e, "leave edit refused");
            ApiErrorResponse::from(e)
        })?;
    Ok(Json(request))
}

/// Handler for DELETE /leaves/{id} (pending requests only).
async fn delete_leave(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Query(query): Query<DeleteLeaveQuery>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    state
        .service()
        .delete_leave_request(request_id, query.actor_id)
        .map_err(ApiErrorResponse::from)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /leaves/{id}/transition.
async fn transition_leave(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    payload: Result<Json<TransitionBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Json(body) = payload.map_err(|rejection| bad_json(rejection, correlation_id))?;

    info!(
        correlation_id = %correlation_id,
        request_id = %request_id,
        actor_id = %body.actor_id,
        action = ?body.action,
        "processing leave transition"
    );

    let options = TransitionOptions {
        cancellation_reason: body.cancellation_reason,
    };
    let request = state
        .service()
        .transition_leave_request(request_id, body.actor_id, body.action, options)
        .map_err(|e| {
            warn!(correlation_id = %correlation_id, error = %e, "leave transition refused");
            ApiErrorResponse::from(e)
        })?;
    Ok(Json(request))
}

/// Handler for GET /employees/{id}/balances.
async fn employee_balances(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<BalancesQuery>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let balances = state
        .service()
        .get_balances(employee_id, query.year)
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(balances))
}

/// Handler for GET /employees/{id}/summary.
async fn employee_summary(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let summary = state
        .service()
        .leave_summary(employee_id)
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(summary))
}

/// Handler for GET /employees/{id}/forfeiture.
async fn forfeiture_preview(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let items = state
        .service()
        .preview_forfeiture(employee_id)
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(items))
}

/// Handler for POST /employees/{id}/forfeiture/process.
async fn process_forfeiture(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    payload: Result<Json<ForfeitureProcessBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Json(body) = payload.map_err(|rejection| bad_json(rejection, correlation_id))?;

    let items = state
        .service()
        .acknowledge_and_process_forfeiture(employee_id, body.acknowledged)
        .map_err(|e| {
            warn!(correlation_id = %correlation_id, error = %e, "forfeiture processing refused");
            ApiErrorResponse::from(e)
        })?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        cycles = items.len(),
        "forfeiture processed"
    );
    Ok(Json(items))
}

/// Handler for POST /accrual/run.
///
/// Invoked by the monthly scheduler, never by end-user sessions; callers
/// authenticate with the shared bearer token.
async fn run_accrual(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccrualRunBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();

    let authorized = match state.accrual_token() {
        Some(token) => headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {token}")),
        None => false,
    };
    if !authorized {
        warn!(correlation_id = %correlation_id, "accrual trigger rejected: bad or missing token");
        return Err(ApiErrorResponse::new(
            StatusCode::UNAUTHORIZED,
            ApiError::unauthorized("a valid accrual bearer token is required"),
        ));
    }

    let Json(body) = payload.map_err(|rejection| bad_json(rejection, correlation_id))?;

    info!(
        correlation_id = %correlation_id,
        as_of = %body.as_of_date,
        "running monthly accrual"
    );
    let run = state
        .service()
        .run_monthly_accrual(body.as_of_date)
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(run))
}

/// Handler for GET /holidays/{year}.
async fn list_holidays(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let holidays = state
        .service()
        .holidays(year)
        .map_err(ApiErrorResponse::from)?;
    Ok(Json(holidays))
}
