//! Enrollment reconciliation.
//!
//! A submission names a program, a child and either one guardian or both parents.
//! The workflow runs strictly in order: check the program, upsert the child, upsert
//! the adults and their links, then write the enrollment. There is no transaction
//! around the sequence. Every step is keyed by document ID (or child + slot, or
//! program + child), so a submission interrupted halfway converges when retried.

mod identity;
mod upsert;
mod validate;
mod writer;

use upsert::{upsert_child, upsert_guardians};
use writer::{ensure_active_program, write_enrollment};

pub use validate::{validate, GuardianSet, ValidatedEnrollment};
pub use writer::EnrollmentOutcome;

use crate::db::EnrollmentStore;
use crate::errors::AppError;

/// Run the whole workflow for a validated submission.
///
/// The program check happens before any write, so a missing or inactive program
/// leaves the store untouched.
pub async fn enroll(
    store: &dyn EnrollmentStore,
    submission: &ValidatedEnrollment,
) -> Result<EnrollmentOutcome, AppError> {
    let program = ensure_active_program(store, submission.program_id).await?;

    let child = upsert_child(store, &submission.child).await?;
    upsert_guardians(store, &child, &submission.guardians).await?;

    write_enrollment(store, program.id, child.id).await
}
