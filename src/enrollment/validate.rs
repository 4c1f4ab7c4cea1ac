//! Turns a raw enrollment submission into a validated one.
//!
//! Runs before any side effect; every missing field is reported at once.

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::{ChildInput, EnrollmentRequest, MemberInput, Relationship};

/// The adults supplied with a submission. Exactly one mode per submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardianSet {
    Guardian(MemberInput),
    Parents {
        father: MemberInput,
        mother: MemberInput,
    },
}

impl GuardianSet {
    /// Relationship slots filled by this submission, in write order.
    pub fn slots(&self) -> Vec<(Relationship, &MemberInput)> {
        match self {
            GuardianSet::Guardian(guardian) => vec![(Relationship::Guardian, guardian)],
            GuardianSet::Parents { father, mother } => vec![
                (Relationship::Father, father),
                (Relationship::Mother, mother),
            ],
        }
    }

    pub fn uses_parents(&self) -> bool {
        matches!(self, GuardianSet::Parents { .. })
    }
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEnrollment {
    pub program_id: i64,
    pub child: ChildInput,
    pub guardians: GuardianSet,
}

/// Check required fields and normalize values (trimmed, blanks dropped).
pub fn validate(request: &EnrollmentRequest) -> Result<ValidatedEnrollment, AppError> {
    let mut missing: Vec<&'static str> = Vec::new();

    if request.program_id.is_none() {
        missing.push("programId");
    }
    let child_name = required(&request.child_name, "childName", &mut missing);
    let child_document_id = required(&request.child_document_id, "childDocumentID", &mut missing);

    let use_guardian = request.use_guardian.unwrap_or(false);
    let guardians = if use_guardian {
        member(
            &request.guardian_name,
            &request.guardian_document_id,
            &request.guardian_phone,
            ["guardianName", "guardianDocumentID", "guardianPhone"],
            &mut missing,
        )
        .map(GuardianSet::Guardian)
    } else {
        let father = member(
            &request.father_name,
            &request.father_document_id,
            &request.father_phone,
            ["fatherName", "fatherDocumentID", "fatherPhone"],
            &mut missing,
        );
        let mother = member(
            &request.mother_name,
            &request.mother_document_id,
            &request.mother_phone,
            ["motherName", "motherDocumentID", "motherPhone"],
            &mut missing,
        );
        match (father, mother) {
            (Some(father), Some(mother)) => Some(GuardianSet::Parents { father, mother }),
            _ => None,
        }
    };

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let birth_date = optional(&request.child_birth_date);
    if let Some(date) = &birth_date {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(AppError::Validation(
                "childBirthDate must be a date in YYYY-MM-DD format".to_string(),
            ));
        }
    }

    match (request.program_id, child_name, child_document_id, guardians) {
        (Some(program_id), Some(name), Some(document_id), Some(guardians)) => {
            Ok(ValidatedEnrollment {
                program_id,
                child: ChildInput {
                    name,
                    document_id,
                    gender: optional(&request.child_gender),
                    birth_date,
                },
                guardians,
            })
        }
        // Unreachable once `missing` is empty, but keeps the match total.
        _ => Err(AppError::Validation("Missing required fields".to_string())),
    }
}

fn required(
    value: &Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = optional(value);
    if value.is_none() {
        missing.push(field);
    }
    value
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn member(
    name: &Option<String>,
    document_id: &Option<String>,
    phone: &Option<String>,
    fields: [&'static str; 3],
    missing: &mut Vec<&'static str>,
) -> Option<MemberInput> {
    let name = required(name, fields[0], missing);
    let document_id = required(document_id, fields[1], missing);
    let phone = required(phone, fields[2], missing);
    Some(MemberInput {
        name: name?,
        document_id: document_id?,
        phone: phone?,
    })
}
