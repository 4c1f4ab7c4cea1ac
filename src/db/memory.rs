//! In-memory [`EnrollmentStore`] for exercising the workflow without SQLite.
//!
//! Enforces the same unique keys as the schema and reports violations as
//! [`AppError::Conflict`]. Timestamps come from a logical clock so every write is
//! strictly later than the one before.

use std::sync::Mutex;

use async_trait::async_trait;

use super::EnrollmentStore;
use crate::errors::AppError;
use crate::models::{
    Child, ChildGuardian, ChildInput, Enrollment, Member, MemberInput, Program, Relationship,
};

#[derive(Default)]
struct State {
    clock: u64,
    next_id: i64,
    programs: Vec<Program>,
    children: Vec<Child>,
    members: Vec<Member>,
    links: Vec<ChildGuardian>,
    enrollments: Vec<Enrollment>,
    /// Lookups by document ID that pretend the row is not there yet.
    stale_child_lookups: usize,
    stale_member_lookups: usize,
    stale_link_lookups: usize,
    writes: usize,
}

impl State {
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("2024-01-01T00:00:00.{:06}Z", self.clock)
    }

    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_program(&self, title: &str, is_active: bool) -> Program {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let program = Program {
            id: state.id(),
            title: title.to_string(),
            department: "Children".to_string(),
            content: String::new(),
            is_active,
            created_at: now.clone(),
            updated_at: now,
        };
        state.programs.push(program.clone());
        program
    }

    /// Make the next `n` child lookups miss, as if another request inserted the row
    /// between our lookup and our insert.
    pub fn stale_child_lookups(&self, n: usize) {
        self.state.lock().unwrap().stale_child_lookups = n;
    }

    pub fn stale_member_lookups(&self, n: usize) {
        self.state.lock().unwrap().stale_member_lookups = n;
    }

    pub fn stale_link_lookups(&self, n: usize) {
        self.state.lock().unwrap().stale_link_lookups = n;
    }

    pub fn children(&self) -> Vec<Child> {
        self.state.lock().unwrap().children.clone()
    }

    pub fn members(&self) -> Vec<Member> {
        self.state.lock().unwrap().members.clone()
    }

    pub fn links(&self) -> Vec<ChildGuardian> {
        self.state.lock().unwrap().links.clone()
    }

    pub fn enrollments(&self) -> Vec<Enrollment> {
        self.state.lock().unwrap().enrollments.clone()
    }

    /// Number of successful insert/update calls so far.
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn get_program(&self, id: i64) -> Result<Option<Program>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.programs.iter().find(|p| p.id == id).cloned())
    }

    async fn find_child_by_document(&self, document_id: &str) -> Result<Option<Child>, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.stale_child_lookups > 0 {
            state.stale_child_lookups -= 1;
            return Ok(None);
        }
        Ok(state
            .children
            .iter()
            .find(|c| c.document_id == document_id)
            .cloned())
    }

    async fn insert_child(&self, input: &ChildInput) -> Result<Child, AppError> {
        let mut state = self.state.lock().unwrap();
        if state
            .children
            .iter()
            .any(|c| c.document_id == input.document_id)
        {
            return Err(AppError::Conflict(
                "UNIQUE constraint failed: children.document_id".to_string(),
            ));
        }
        let now = state.tick();
        let child = Child {
            id: state.id(),
            name: input.name.clone(),
            document_id: input.document_id.clone(),
            gender: input.gender.clone(),
            birth_date: input.birth_date.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        state.children.push(child.clone());
        state.writes += 1;
        Ok(child)
    }

    async fn update_child(&self, id: i64, input: &ChildInput) -> Result<Child, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let child = state
            .children
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Child {} not found", id)))?;
        child.name = input.name.clone();
        if input.gender.is_some() {
            child.gender = input.gender.clone();
        }
        if input.birth_date.is_some() {
            child.birth_date = input.birth_date.clone();
        }
        child.updated_at = now;
        let child = child.clone();
        state.writes += 1;
        Ok(child)
    }

    async fn find_member_by_document(
        &self,
        document_id: &str,
    ) -> Result<Option<Member>, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.stale_member_lookups > 0 {
            state.stale_member_lookups -= 1;
            return Ok(None);
        }
        Ok(state
            .members
            .iter()
            .find(|m| m.document_id == document_id)
            .cloned())
    }

    async fn insert_member(&self, input: &MemberInput) -> Result<Member, AppError> {
        let mut state = self.state.lock().unwrap();
        if state
            .members
            .iter()
            .any(|m| m.document_id == input.document_id)
        {
            return Err(AppError::Conflict(
                "UNIQUE constraint failed: members.document_id".to_string(),
            ));
        }
        let now = state.tick();
        let member = Member {
            id: state.id(),
            name: input.name.clone(),
            document_id: input.document_id.clone(),
            phone: input.phone.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        state.members.push(member.clone());
        state.writes += 1;
        Ok(member)
    }

    async fn update_member(&self, id: i64, input: &MemberInput) -> Result<Member, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let member = state
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;
        member.name = input.name.clone();
        member.phone = input.phone.clone();
        member.updated_at = now;
        let member = member.clone();
        state.writes += 1;
        Ok(member)
    }

    async fn find_guardian_link(
        &self,
        child_id: i64,
        relationship: Relationship,
    ) -> Result<Option<ChildGuardian>, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.stale_link_lookups > 0 {
            state.stale_link_lookups -= 1;
            return Ok(None);
        }
        Ok(state
            .links
            .iter()
            .find(|l| l.child_id == child_id && l.relationship == relationship)
            .cloned())
    }

    async fn list_guardian_links(&self, child_id: i64) -> Result<Vec<ChildGuardian>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .iter()
            .filter(|l| l.child_id == child_id)
            .cloned()
            .collect())
    }

    async fn insert_guardian_link(
        &self,
        child_id: i64,
        member_id: i64,
        relationship: Relationship,
    ) -> Result<ChildGuardian, AppError> {
        let mut state = self.state.lock().unwrap();
        if state
            .links
            .iter()
            .any(|l| l.child_id == child_id && l.relationship == relationship)
        {
            return Err(AppError::Conflict(
                "UNIQUE constraint failed: child_guardians.child_id, child_guardians.relationship"
                    .to_string(),
            ));
        }
        let now = state.tick();
        let link = ChildGuardian {
            id: state.id(),
            child_id,
            member_id,
            relationship,
            created_at: now.clone(),
            updated_at: now,
        };
        state.links.push(link.clone());
        state.writes += 1;
        Ok(link)
    }

    async fn repoint_guardian_link(
        &self,
        link_id: i64,
        member_id: i64,
    ) -> Result<ChildGuardian, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let link = state
            .links
            .iter_mut()
            .find(|l| l.id == link_id)
            .ok_or_else(|| AppError::NotFound(format!("Guardian link {} not found", link_id)))?;
        link.member_id = member_id;
        link.updated_at = now;
        let link = link.clone();
        state.writes += 1;
        Ok(link)
    }

    async fn insert_enrollment(
        &self,
        program_id: i64,
        child_id: i64,
    ) -> Result<Enrollment, AppError> {
        let mut state = self.state.lock().unwrap();
        if state
            .enrollments
            .iter()
            .any(|e| e.program_id == program_id && e.child_id == child_id)
        {
            return Err(AppError::Conflict(
                "UNIQUE constraint failed: enrollments.program_id, enrollments.child_id"
                    .to_string(),
            ));
        }
        let now = state.tick();
        let enrollment = Enrollment {
            id: state.id(),
            program_id,
            child_id,
            created_at: now.clone(),
            updated_at: now,
        };
        state.enrollments.push(enrollment.clone());
        state.writes += 1;
        Ok(enrollment)
    }

    async fn find_enrollment(
        &self,
        program_id: i64,
        child_id: i64,
    ) -> Result<Option<Enrollment>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .enrollments
            .iter()
            .find(|e| e.program_id == program_id && e.child_id == child_id)
            .cloned())
    }

    async fn touch_enrollment(&self, id: i64) -> Result<Enrollment, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let enrollment = state
            .enrollments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Enrollment {} not found", id)))?;
        enrollment.updated_at = now;
        let enrollment = enrollment.clone();
        state.writes += 1;
        Ok(enrollment)
    }
}
