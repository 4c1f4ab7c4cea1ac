//! Enrollment API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::{json_body, success, ApiResult};
use crate::db::EnrollmentStore;
use crate::enrollment::{self, EnrollmentOutcome};
use crate::errors::AppError;
use crate::models::{EnrollmentListing, EnrollmentRequest, EnrollmentResponse};
use crate::turnstile::TOKEN_HEADER;
use crate::AppState;

/// Headers carrying the caller's address, most specific first.
const CLIENT_IP_HEADERS: [&str; 2] = ["cf-connecting-ip", "x-real-ip"];

/// POST /api/enrollments - Enroll a child in a program.
///
/// Responds 201 for a new enrollment and 200 when the child was already enrolled.
pub async fn submit_enrollment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), AppError> {
    let request = json_body(payload)?;

    // Field checks first, so a malformed form does not spend the one-time token.
    let submission = enrollment::validate(&request)?;

    let token = request
        .turnstile_token
        .as_deref()
        .or_else(|| header_value(&headers, TOKEN_HEADER));
    let remote_ip = CLIENT_IP_HEADERS
        .iter()
        .find_map(|name| header_value(&headers, name));
    state.verifier.verify(token, remote_ip).await?;

    let outcome = enrollment::enroll(state.repo.as_ref(), &submission).await?;

    let (status, message) = match &outcome {
        EnrollmentOutcome::Created(_) => (StatusCode::CREATED, "Enrollment created successfully"),
        EnrollmentOutcome::Refreshed(_) => (StatusCode::OK, "Enrollment updated successfully"),
    };

    Ok((
        status,
        Json(EnrollmentResponse {
            message: message.to_string(),
            enrollment_id: outcome.enrollment().id,
        }),
    ))
}

/// GET /api/admin/programs/:id/enrollments - List a program's enrollments.
pub async fn list_program_enrollments(
    State(state): State<AppState>,
    Path(program_id): Path<i64>,
) -> ApiResult<Vec<EnrollmentListing>> {
    if state.repo.get_program(program_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Program {} not found",
            program_id
        )));
    }

    success(state.repo.list_enrollments_for_program(program_id).await?)
}

/// DELETE /api/admin/enrollments/:id - Remove an enrollment.
pub async fn delete_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state.repo.delete_enrollment(id).await?;
    tracing::info!(enrollment_id = id, "Deleted enrollment");
    success(())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
