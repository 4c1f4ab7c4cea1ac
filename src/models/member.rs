//! Member model: an adult acting as parent, guardian or volunteer.

use serde::{Deserialize, Serialize};

/// An adult member, identified by document ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub name: String,
    #[serde(rename = "documentID")]
    pub document_id: String,
    pub phone: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Submitted member attributes, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInput {
    pub name: String,
    pub document_id: String,
    pub phone: String,
}
