//! Creates or refreshes children, members and the links between them.
//!
//! Each upsert is keyed by a natural identifier (document ID, or child + slot), so a
//! retried submission converges on the same rows. An insert that loses a race against
//! a concurrent submission falls back to the update path.

use super::identity::{resolve_child, resolve_member};
use super::validate::GuardianSet;
use crate::db::EnrollmentStore;
use crate::errors::AppError;
use crate::models::{Child, ChildGuardian, ChildInput, Member, MemberInput, Relationship};

pub async fn upsert_child(
    store: &dyn EnrollmentStore,
    input: &ChildInput,
) -> Result<Child, AppError> {
    if let Some(existing) = resolve_child(store, &input.document_id).await? {
        tracing::info!(child_id = existing.id, "Updating existing child");
        return store.update_child(existing.id, input).await;
    }

    match store.insert_child(input).await {
        Ok(child) => {
            tracing::info!(child_id = child.id, "Created child");
            Ok(child)
        }
        Err(err) if err.is_conflict() => {
            let existing = resolve_child(store, &input.document_id)
                .await?
                .ok_or_else(|| vanished_after_conflict("child", &input.document_id, err))?;
            tracing::info!(child_id = existing.id, "Child created concurrently; updating");
            store.update_child(existing.id, input).await
        }
        Err(err) => Err(err),
    }
}

pub async fn upsert_member(
    store: &dyn EnrollmentStore,
    input: &MemberInput,
) -> Result<Member, AppError> {
    if let Some(existing) = resolve_member(store, &input.document_id).await? {
        tracing::info!(member_id = existing.id, "Updating existing member");
        return store.update_member(existing.id, input).await;
    }

    match store.insert_member(input).await {
        Ok(member) => {
            tracing::info!(member_id = member.id, "Created member");
            Ok(member)
        }
        Err(err) if err.is_conflict() => {
            let existing = resolve_member(store, &input.document_id)
                .await?
                .ok_or_else(|| vanished_after_conflict("member", &input.document_id, err))?;
            tracing::info!(member_id = existing.id, "Member created concurrently; updating");
            store.update_member(existing.id, input).await
        }
        Err(err) => Err(err),
    }
}

/// Ensure `child_id` has exactly one link in `relationship`, pointing at `member_id`.
pub async fn upsert_link(
    store: &dyn EnrollmentStore,
    child_id: i64,
    member_id: i64,
    relationship: Relationship,
) -> Result<ChildGuardian, AppError> {
    if let Some(link) = store.find_guardian_link(child_id, relationship).await? {
        tracing::debug!(link_id = link.id, %relationship, member_id, "Repointing link");
        return store.repoint_guardian_link(link.id, member_id).await;
    }

    match store
        .insert_guardian_link(child_id, member_id, relationship)
        .await
    {
        Ok(link) => {
            tracing::debug!(link_id = link.id, %relationship, member_id, "Created link");
            Ok(link)
        }
        Err(err) if err.is_conflict() => {
            let link = store
                .find_guardian_link(child_id, relationship)
                .await?
                .ok_or_else(|| {
                    let key = format!("{}/{}", child_id, relationship);
                    vanished_after_conflict("guardian link", &key, err)
                })?;
            tracing::debug!(
                link_id = link.id,
                %relationship,
                member_id,
                "Link created concurrently; repointing"
            );
            store.repoint_guardian_link(link.id, member_id).await
        }
        Err(err) => Err(err),
    }
}

/// An insert hit a unique key, yet the row it collided with cannot be found.
/// Reported as a server error; the caller never sees the raw conflict.
fn vanished_after_conflict(kind: &str, key: &str, conflict: AppError) -> AppError {
    AppError::Internal(format!(
        "Insert of {} {} conflicted but no row was found ({})",
        kind, key, conflict
    ))
}

/// Upsert every adult in `guardians`, then link each one to `child`.
pub async fn upsert_guardians(
    store: &dyn EnrollmentStore,
    child: &Child,
    guardians: &GuardianSet,
) -> Result<Vec<ChildGuardian>, AppError> {
    let slots = guardians.slots();

    let mut members = Vec::with_capacity(slots.len());
    for (relationship, input) in &slots {
        members.push((*relationship, upsert_member(store, input).await?));
    }

    let mut links = Vec::with_capacity(members.len());
    for (relationship, member) in &members {
        links.push(upsert_link(store, child.id, member.id, *relationship).await?);
    }

    warn_on_mixed_modes(store, child, guardians).await?;

    Ok(links)
}

/// Links from the other mode are kept; an admin may need to clean them up.
async fn warn_on_mixed_modes(
    store: &dyn EnrollmentStore,
    child: &Child,
    guardians: &GuardianSet,
) -> Result<(), AppError> {
    let parents = guardians.uses_parents();
    let stale: Vec<Relationship> = store
        .list_guardian_links(child.id)
        .await?
        .into_iter()
        .map(|link| link.relationship)
        .filter(|relationship| relationship.is_parent() != parents)
        .collect();

    if !stale.is_empty() {
        tracing::warn!(
            child_id = child.id,
            ?stale,
            "Child holds guardian and parent links from different submissions"
        );
    }

    Ok(())
}
