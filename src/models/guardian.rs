//! Child–guardian relationship model.

use serde::{Deserialize, Serialize};

/// The slot an adult occupies for a child. Each child has at most one row per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Father,
    Mother,
    Guardian,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Father => "father",
            Relationship::Mother => "mother",
            Relationship::Guardian => "guardian",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "father" => Some(Relationship::Father),
            "mother" => Some(Relationship::Mother),
            "guardian" => Some(Relationship::Guardian),
            _ => None,
        }
    }

    /// Whether this slot belongs to the two-parent mode.
    pub fn is_parent(&self) -> bool {
        matches!(self, Relationship::Father | Relationship::Mother)
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row linking a child to a member in a given slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildGuardian {
    pub id: i64,
    pub child_id: i64,
    pub member_id: i64,
    pub relationship: Relationship,
    pub created_at: String,
    pub updated_at: String,
}

/// A guardian link joined with the member it points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianLinkDetail {
    pub id: i64,
    pub relationship: Relationship,
    pub member_id: i64,
    pub member_name: String,
    #[serde(rename = "memberDocumentID")]
    pub member_document_id: String,
    pub member_phone: String,
    pub updated_at: String,
}
