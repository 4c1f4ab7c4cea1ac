//! Writes the enrollment row, turning a duplicate into a refresh.

use crate::db::EnrollmentStore;
use crate::errors::AppError;
use crate::models::{Enrollment, Program};

/// What happened to the (program, child) pair.
#[derive(Debug, Clone)]
pub enum EnrollmentOutcome {
    /// First enrollment of this child in this program.
    Created(Enrollment),
    /// The child was already enrolled; `updated_at` was bumped.
    Refreshed(Enrollment),
}

impl EnrollmentOutcome {
    pub fn enrollment(&self) -> &Enrollment {
        match self {
            EnrollmentOutcome::Created(e) | EnrollmentOutcome::Refreshed(e) => e,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, EnrollmentOutcome::Created(_))
    }
}

/// Fetch the program, failing with `NotFound` unless it exists and is active.
pub async fn ensure_active_program(
    store: &dyn EnrollmentStore,
    program_id: i64,
) -> Result<Program, AppError> {
    match store.get_program(program_id).await? {
        Some(program) if program.is_active => Ok(program),
        Some(_) => Err(AppError::NotFound(format!(
            "Program {} is not accepting enrollments",
            program_id
        ))),
        None => Err(AppError::NotFound(format!(
            "Program {} not found",
            program_id
        ))),
    }
}

pub async fn write_enrollment(
    store: &dyn EnrollmentStore,
    program_id: i64,
    child_id: i64,
) -> Result<EnrollmentOutcome, AppError> {
    match store.insert_enrollment(program_id, child_id).await {
        Ok(enrollment) => {
            tracing::info!(enrollment_id = enrollment.id, program_id, child_id, "Enrolled child");
            Ok(EnrollmentOutcome::Created(enrollment))
        }
        Err(err) if err.is_conflict() => {
            let existing = store
                .find_enrollment(program_id, child_id)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "Enrollment of child {} in program {} conflicted but was not found",
                        child_id, program_id
                    ))
                })?;
            let refreshed = store.touch_enrollment(existing.id).await?;
            tracing::info!(
                enrollment_id = refreshed.id,
                program_id,
                child_id,
                "Child already enrolled; refreshed"
            );
            Ok(EnrollmentOutcome::Refreshed(refreshed))
        }
        Err(err) => Err(err),
    }
}
