//! Enrollment models: the stored link and the public submission body.

use serde::{Deserialize, Serialize};

/// A child's registration in a program. Unique per (program, child).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i64,
    pub program_id: i64,
    pub child_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// An enrollment joined with the enrolled child, for admin listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentListing {
    pub id: i64,
    pub program_id: i64,
    pub child_id: i64,
    pub child_name: String,
    #[serde(rename = "childDocumentID")]
    pub child_document_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Public enrollment form submission. Every field is optional on the wire;
/// required fields are checked by validation before anything is written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub child_name: Option<String>,
    #[serde(default, rename = "childDocumentID")]
    pub child_document_id: Option<String>,
    #[serde(default)]
    pub child_gender: Option<String>,
    #[serde(default)]
    pub child_birth_date: Option<String>,
    #[serde(default)]
    pub guardian_name: Option<String>,
    #[serde(default, rename = "guardianDocumentID")]
    pub guardian_document_id: Option<String>,
    #[serde(default)]
    pub guardian_phone: Option<String>,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default, rename = "fatherDocumentID")]
    pub father_document_id: Option<String>,
    #[serde(default)]
    pub father_phone: Option<String>,
    #[serde(default)]
    pub mother_name: Option<String>,
    #[serde(default, rename = "motherDocumentID")]
    pub mother_document_id: Option<String>,
    #[serde(default)]
    pub mother_phone: Option<String>,
    #[serde(default)]
    pub use_guardian: Option<bool>,
    #[serde(default)]
    pub turnstile_token: Option<String>,
}

/// Body returned for both a new and a refreshed enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub message: String,
    pub enrollment_id: i64,
}
