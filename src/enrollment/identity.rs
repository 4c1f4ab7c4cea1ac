//! Looks up existing people by document ID. Never writes.

use crate::db::EnrollmentStore;
use crate::errors::AppError;
use crate::models::{Child, Member};

pub async fn resolve_child(
    store: &dyn EnrollmentStore,
    document_id: &str,
) -> Result<Option<Child>, AppError> {
    let child = store.find_child_by_document(document_id).await?;
    tracing::debug!(document_id, found = child.is_some(), "Resolved child");
    Ok(child)
}

pub async fn resolve_member(
    store: &dyn EnrollmentStore,
    document_id: &str,
) -> Result<Option<Member>, AppError> {
    let member = store.find_member_by_document(document_id).await?;
    tracing::debug!(document_id, found = member.is_some(), "Resolved member");
    Ok(member)
}
