//! Child model.

use serde::{Deserialize, Serialize};

use super::GuardianLinkDetail;

/// A child known to the parish, identified by document ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: i64,
    pub name: String,
    #[serde(rename = "documentID")]
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Submitted child attributes, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInput {
    pub name: String,
    pub document_id: String,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
}

/// A child together with the adults linked to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildDetail {
    #[serde(flatten)]
    pub child: Child,
    pub guardians: Vec<GuardianLinkDetail>,
}
