use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::admission::{AdmissionError, AdmissionService, DriverSubmission, RiderSubmission};
use crate::region::RegionTag;
use crate::store::{DriverRecord, RiderRecord};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

impl From<AdmissionError> for ApiError {
    fn from(e: AdmissionError) -> Self {
        let status = match e {
            AdmissionError::InvalidAddress
            | AdmissionError::DuplicateRider
            | AdmissionError::MissingField(_) => StatusCode::BAD_REQUEST,
            AdmissionError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

#[derive(Serialize)]
pub struct MessageBody {
    message: &'static str,
}

/// Admission does blocking HTTP; keep it off the async workers.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AdmissionService) -> Result<T, AdmissionError> + Send + 'static,
    T: Send + 'static,
{
    let service = state.admissions.clone();
    match tokio::task::spawn_blocking(move || f(&service)).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!(error = %e, "admission task failed");
            Err(ApiError::from(AdmissionError::Internal))
        }
    }
}

// ─── /api/drivers ────────────────────────────────────────────────

pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DriverRecord>>, ApiError> {
    blocking(&state, |svc| svc.list_drivers()).await.map(Json)
}

pub async fn add_driver(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DriverSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let Json(submission) = payload?;
    blocking(&state, move |svc| svc.admit_driver(submission)).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageBody { message: "Driver added successfully!" }),
    ))
}

// ─── /api/riders ─────────────────────────────────────────────────

pub async fn list_riders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RiderRecord>>, ApiError> {
    blocking(&state, |svc| svc.list_riders()).await.map(Json)
}

pub async fn add_rider(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RiderSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let Json(submission) = payload?;
    blocking(&state, move |svc| svc.admit_rider(submission)).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageBody { message: "Rider added successfully!" }),
    ))
}

// ─── GET /api/regions ────────────────────────────────────────────

pub async fn region_list() -> Json<[RegionTag; 6]> {
    Json(RegionTag::ALL)
}
