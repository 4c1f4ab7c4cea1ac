//! Data-access seam used by the enrollment workflow.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{
    Child, ChildGuardian, ChildInput, Enrollment, Member, MemberInput, Program, Relationship,
};

/// Storage operations the enrollment workflow needs.
///
/// Inserts that hit a unique constraint must fail with [`AppError::Conflict`]; the
/// workflow recovers from that error and from no other.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn get_program(&self, id: i64) -> Result<Option<Program>, AppError>;

    async fn find_child_by_document(&self, document_id: &str) -> Result<Option<Child>, AppError>;
    async fn insert_child(&self, input: &ChildInput) -> Result<Child, AppError>;
    /// Overwrite the name and bump `updated_at`.
    ///
    /// Gender and birth date are overwritten only when the submission carries them.
    /// A `None` keeps the stored value rather than clearing it, so a resubmission
    /// that omits an optional field does not erase what an earlier one recorded.
    async fn update_child(&self, id: i64, input: &ChildInput) -> Result<Child, AppError>;

    async fn find_member_by_document(&self, document_id: &str)
        -> Result<Option<Member>, AppError>;
    async fn insert_member(&self, input: &MemberInput) -> Result<Member, AppError>;
    async fn update_member(&self, id: i64, input: &MemberInput) -> Result<Member, AppError>;

    async fn find_guardian_link(
        &self,
        child_id: i64,
        relationship: Relationship,
    ) -> Result<Option<ChildGuardian>, AppError>;
    async fn list_guardian_links(&self, child_id: i64) -> Result<Vec<ChildGuardian>, AppError>;
    async fn insert_guardian_link(
        &self,
        child_id: i64,
        member_id: i64,
        relationship: Relationship,
    ) -> Result<ChildGuardian, AppError>;
    /// Point an existing link at another member and bump `updated_at`.
    async fn repoint_guardian_link(
        &self,
        link_id: i64,
        member_id: i64,
    ) -> Result<ChildGuardian, AppError>;

    async fn insert_enrollment(
        &self,
        program_id: i64,
        child_id: i64,
    ) -> Result<Enrollment, AppError>;
    async fn find_enrollment(
        &self,
        program_id: i64,
        child_id: i64,
    ) -> Result<Option<Enrollment>, AppError>;
    /// Bump `updated_at` on an existing enrollment.
    async fn touch_enrollment(&self, id: i64) -> Result<Enrollment, AppError>;
}
