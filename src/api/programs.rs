//! Program API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{json_body, success, ApiResult};
use crate::db::EnrollmentStore;
use crate::errors::AppError;
use crate::models::{CreateProgramRequest, Program, UpdateProgramRequest};
use crate::AppState;

/// GET /api/programs - List programs open for enrollment.
pub async fn list_active_programs(State(state): State<AppState>) -> ApiResult<Vec<Program>> {
    success(state.repo.list_programs(true).await?)
}

/// GET /api/programs/:id - Get a program open for enrollment.
pub async fn get_active_program(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Program> {
    match state.repo.get_program(id).await? {
        Some(program) if program.is_active => success(program),
        _ => Err(AppError::NotFound(format!("Program {} not found", id))),
    }
}

/// GET /api/admin/programs - List all programs.
pub async fn list_programs(State(state): State<AppState>) -> ApiResult<Vec<Program>> {
    success(state.repo.list_programs(false).await?)
}

/// GET /api/admin/programs/:id - Get a program, active or not.
pub async fn get_program(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Program> {
    match state.repo.get_program(id).await? {
        Some(program) => success(program),
        None => Err(AppError::NotFound(format!("Program {} not found", id))),
    }
}

/// POST /api/admin/programs - Create a new program.
pub async fn create_program(
    State(state): State<AppState>,
    payload: Result<Json<CreateProgramRequest>, JsonRejection>,
) -> ApiResult<Program> {
    let request = json_body(payload)?;

    // Validate required fields
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.department.trim().is_empty() {
        return Err(AppError::Validation("Department is required".to_string()));
    }

    let program = state.repo.create_program(&request).await?;
    tracing::info!(program_id = program.id, title = %program.title, "Created program");
    success(program)
}

/// PUT /api/admin/programs/:id - Update a program.
pub async fn update_program(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateProgramRequest>, JsonRejection>,
) -> ApiResult<Program> {
    let request = json_body(payload)?;

    if request.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("Title cannot be blank".to_string()));
    }
    if request
        .department
        .as_deref()
        .is_some_and(|d| d.trim().is_empty())
    {
        return Err(AppError::Validation("Department cannot be blank".to_string()));
    }

    success(state.repo.update_program(id, &request).await?)
}

/// DELETE /api/admin/programs/:id - Delete a program and its enrollments.
pub async fn delete_program(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_program(id).await?;
    tracing::info!(program_id = id, "Deleted program");
    success(())
}
