//! Child and member API endpoints (admin only).

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Child, ChildDetail, Member};
use crate::AppState;

/// GET /api/admin/children - List all children.
pub async fn list_children(State(state): State<AppState>) -> ApiResult<Vec<Child>> {
    success(state.repo.list_children().await?)
}

/// GET /api/admin/children/:id - Get a child with its guardians.
pub async fn get_child(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ChildDetail> {
    match state.repo.get_child_detail(id).await? {
        Some(detail) => success(detail),
        None => Err(AppError::NotFound(format!("Child {} not found", id))),
    }
}

/// GET /api/admin/members - List all members.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    success(state.repo.list_members().await?)
}
