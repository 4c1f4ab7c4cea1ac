//! Database repository for CRUD operations.
//!
//! Uses prepared statements throughout; every value reaches SQLite as a bound parameter.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::{now_timestamp, EnrollmentStore};
use crate::errors::AppError;
use crate::models::{
    Child, ChildDetail, ChildGuardian, ChildInput, CreateProgramRequest, Enrollment,
    EnrollmentListing, GuardianLinkDetail, Member, MemberInput, Program, Relationship,
    UpdateProgramRequest,
};

const PROGRAM_COLUMNS: &str =
    "id, title, department, content, is_active, created_at, updated_at";
const CHILD_COLUMNS: &str = "id, name, document_id, gender, birth_date, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, name, document_id, phone, created_at, updated_at";
const GUARDIAN_COLUMNS: &str = "id, child_id, member_id, relationship, created_at, updated_at";
const ENROLLMENT_COLUMNS: &str = "id, program_id, child_id, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== PROGRAM OPERATIONS ====================

    /// List programs, optionally only the active ones.
    pub async fn list_programs(&self, active_only: bool) -> Result<Vec<Program>, AppError> {
        let sql = if active_only {
            format!(
                "SELECT {PROGRAM_COLUMNS} FROM programs WHERE is_active = 1 ORDER BY department, title"
            )
        } else {
            format!("SELECT {PROGRAM_COLUMNS} FROM programs ORDER BY department, title")
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(program_from_row).collect())
    }

    /// Create a new program.
    pub async fn create_program(&self, request: &CreateProgramRequest) -> Result<Program, AppError> {
        let now = now_timestamp();

        let result = sqlx::query(
            "INSERT INTO programs (title, department, content, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(request.title.trim())
        .bind(request.department.trim())
        .bind(&request.content)
        .bind(request.is_active as i32)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Program {
            id: result.last_insert_rowid(),
            title: request.title.trim().to_string(),
            department: request.department.trim().to_string(),
            content: request.content.clone(),
            is_active: request.is_active,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a program. Fields absent from the request keep their current value.
    pub async fn update_program(
        &self,
        id: i64,
        request: &UpdateProgramRequest,
    ) -> Result<Program, AppError> {
        let existing = self
            .get_program(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Program {} not found", id)))?;

        let now = now_timestamp();
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.title)
            .to_string();
        let department = request
            .department
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.department)
            .to_string();
        let content = request.content.clone().unwrap_or(existing.content);
        let is_active = request.is_active.unwrap_or(existing.is_active);

        sqlx::query(
            "UPDATE programs SET title = ?, department = ?, content = ?, is_active = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&title)
        .bind(&department)
        .bind(&content)
        .bind(is_active as i32)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Program {
            id,
            title,
            department,
            content,
            is_active,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a program. Its enrollments go with it.
    pub async fn delete_program(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM programs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Program {} not found", id)));
        }

        Ok(())
    }

    // ==================== ENROLLMENT OPERATIONS ====================

    /// List a program's enrollments with the enrolled child, newest first.
    pub async fn list_enrollments_for_program(
        &self,
        program_id: i64,
    ) -> Result<Vec<EnrollmentListing>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.program_id, e.child_id, c.name AS child_name,
                   c.document_id AS child_document_id, e.created_at, e.updated_at
            FROM enrollments e
            JOIN children c ON c.id = e.child_id
            WHERE e.program_id = ?
            ORDER BY e.created_at DESC, e.id DESC
            "#,
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| EnrollmentListing {
                id: row.get("id"),
                program_id: row.get("program_id"),
                child_id: row.get("child_id"),
                child_name: row.get("child_name"),
                child_document_id: row.get("child_document_id"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }

    /// Remove an enrollment.
    pub async fn delete_enrollment(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Enrollment {} not found", id)));
        }

        Ok(())
    }

    // ==================== CHILD / MEMBER LISTINGS ====================

    /// List all children by name.
    pub async fn list_children(&self) -> Result<Vec<Child>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {CHILD_COLUMNS} FROM children ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(child_from_row).collect())
    }

    /// Get a child with its guardian links and the members behind them.
    pub async fn get_child_detail(&self, id: i64) -> Result<Option<ChildDetail>, AppError> {
        let row = sqlx::query(&format!("SELECT {CHILD_COLUMNS} FROM children WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(child) = row.as_ref().map(child_from_row) else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT cg.id, cg.relationship, cg.member_id, m.name AS member_name,
                   m.document_id AS member_document_id, m.phone AS member_phone, cg.updated_at
            FROM child_guardians cg
            JOIN members m ON m.id = cg.member_id
            WHERE cg.child_id = ?
            ORDER BY cg.relationship
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let guardians = rows
            .iter()
            .map(|row| -> Result<GuardianLinkDetail, AppError> {
                Ok(GuardianLinkDetail {
                    id: row.get("id"),
                    relationship: relationship_from_row(row)?,
                    member_id: row.get("member_id"),
                    member_name: row.get("member_name"),
                    member_document_id: row.get("member_document_id"),
                    member_phone: row.get("member_phone"),
                    updated_at: row.get("updated_at"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ChildDetail { child, guardians }))
    }

    /// List all members by name.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    async fn get_child(&self, id: i64) -> Result<Child, AppError> {
        let row = sqlx::query(&format!("SELECT {CHILD_COLUMNS} FROM children WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(child_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Child {} not found", id)))
    }

    async fn get_member(&self, id: i64) -> Result<Member, AppError> {
        let row = sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(member_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    async fn get_guardian_link(&self, id: i64) -> Result<ChildGuardian, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {GUARDIAN_COLUMNS} FROM child_guardians WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => guardian_from_row(&row),
            None => Err(AppError::NotFound(format!("Guardian link {} not found", id))),
        }
    }

    async fn get_enrollment(&self, id: i64) -> Result<Enrollment, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(enrollment_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Enrollment {} not found", id)))
    }
}

#[async_trait]
impl EnrollmentStore for Repository {
    async fn get_program(&self, id: i64) -> Result<Option<Program>, AppError> {
        let row = sqlx::query(&format!("SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(program_from_row))
    }

    async fn find_child_by_document(&self, document_id: &str) -> Result<Option<Child>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {CHILD_COLUMNS} FROM children WHERE document_id = ?"
        ))
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(child_from_row))
    }

    async fn insert_child(&self, input: &ChildInput) -> Result<Child, AppError> {
        let now = now_timestamp();

        let result = sqlx::query(
            "INSERT INTO children (name, document_id, gender, birth_date, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&input.name)
        .bind(&input.document_id)
        .bind(&input.gender)
        .bind(&input.birth_date)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Child {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            document_id: input.document_id.clone(),
            gender: input.gender.clone(),
            birth_date: input.birth_date.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn update_child(&self, id: i64, input: &ChildInput) -> Result<Child, AppError> {
        let result = sqlx::query(
            "UPDATE children SET name = ?, gender = COALESCE(?, gender), birth_date = COALESCE(?, birth_date), updated_at = ? WHERE id = ?"
        )
        .bind(&input.name)
        .bind(&input.gender)
        .bind(&input.birth_date)
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Child {} not found", id)));
        }

        self.get_child(id).await
    }

    async fn find_member_by_document(
        &self,
        document_id: &str,
    ) -> Result<Option<Member>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE document_id = ?"
        ))
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    async fn insert_member(&self, input: &MemberInput) -> Result<Member, AppError> {
        let now = now_timestamp();

        let result = sqlx::query(
            "INSERT INTO members (name, document_id, phone, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&input.name)
        .bind(&input.document_id)
        .bind(&input.phone)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Member {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            document_id: input.document_id.clone(),
            phone: input.phone.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn update_member(&self, id: i64, input: &MemberInput) -> Result<Member, AppError> {
        let result = sqlx::query("UPDATE members SET name = ?, phone = ?, updated_at = ? WHERE id = ?")
            .bind(&input.name)
            .bind(&input.phone)
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        self.get_member(id).await
    }

    async fn find_guardian_link(
        &self,
        child_id: i64,
        relationship: Relationship,
    ) -> Result<Option<ChildGuardian>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {GUARDIAN_COLUMNS} FROM child_guardians WHERE child_id = ? AND relationship = ?"
        ))
        .bind(child_id)
        .bind(relationship.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(guardian_from_row).transpose()
    }

    async fn list_guardian_links(&self, child_id: i64) -> Result<Vec<ChildGuardian>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {GUARDIAN_COLUMNS} FROM child_guardians WHERE child_id = ? ORDER BY id"
        ))
        .bind(child_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(guardian_from_row).collect()
    }

    async fn insert_guardian_link(
        &self,
        child_id: i64,
        member_id: i64,
        relationship: Relationship,
    ) -> Result<ChildGuardian, AppError> {
        let now = now_timestamp();

        let result = sqlx::query(
            "INSERT INTO child_guardians (child_id, member_id, relationship, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(child_id)
        .bind(member_id)
        .bind(relationship.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(ChildGuardian {
            id: result.last_insert_rowid(),
            child_id,
            member_id,
            relationship,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn repoint_guardian_link(
        &self,
        link_id: i64,
        member_id: i64,
    ) -> Result<ChildGuardian, AppError> {
        let result =
            sqlx::query("UPDATE child_guardians SET member_id = ?, updated_at = ? WHERE id = ?")
                .bind(member_id)
                .bind(now_timestamp())
                .bind(link_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Guardian link {} not found",
                link_id
            )));
        }

        self.get_guardian_link(link_id).await
    }

    async fn insert_enrollment(
        &self,
        program_id: i64,
        child_id: i64,
    ) -> Result<Enrollment, AppError> {
        let now = now_timestamp();

        let result = sqlx::query(
            "INSERT INTO enrollments (program_id, child_id, created_at, updated_at) VALUES (?, ?, ?, ?)"
        )
        .bind(program_id)
        .bind(child_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Enrollment {
            id: result.last_insert_rowid(),
            program_id,
            child_id,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn find_enrollment(
        &self,
        program_id: i64,
        child_id: i64,
    ) -> Result<Option<Enrollment>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE program_id = ? AND child_id = ?"
        ))
        .bind(program_id)
        .bind(child_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(enrollment_from_row))
    }

    async fn touch_enrollment(&self, id: i64) -> Result<Enrollment, AppError> {
        let result = sqlx::query("UPDATE enrollments SET updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Enrollment {} not found", id)));
        }

        self.get_enrollment(id).await
    }
}

// Helper functions for row conversion

fn program_from_row(row: &sqlx::sqlite::SqliteRow) -> Program {
    let is_active: i32 = row.get("is_active");
    Program {
        id: row.get("id"),
        title: row.get("title"),
        department: row.get("department"),
        content: row.get("content"),
        is_active: is_active != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn child_from_row(row: &sqlx::sqlite::SqliteRow) -> Child {
    Child {
        id: row.get("id"),
        name: row.get("name"),
        document_id: row.get("document_id"),
        gender: row.get("gender"),
        birth_date: row.get("birth_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Member {
    Member {
        id: row.get("id"),
        name: row.get("name"),
        document_id: row.get("document_id"),
        phone: row.get("phone"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn guardian_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChildGuardian, AppError> {
    Ok(ChildGuardian {
        id: row.get("id"),
        child_id: row.get("child_id"),
        member_id: row.get("member_id"),
        relationship: relationship_from_row(row)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn relationship_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Relationship, AppError> {
    let relationship: String = row.get("relationship");
    Relationship::parse(&relationship)
        .ok_or_else(|| AppError::Internal(format!("Unknown relationship {:?}", relationship)))
}

fn enrollment_from_row(row: &sqlx::sqlite::SqliteRow) -> Enrollment {
    Enrollment {
        id: row.get("id"),
        program_id: row.get("program_id"),
        child_id: row.get("child_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
