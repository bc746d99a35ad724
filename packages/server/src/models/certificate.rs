use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::certificate;
use crate::error::AppError;
use crate::issuance::VerificationOutcome;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct IssueCertificateRequest {
    pub user_id: i32,
    pub course_id: i32,
    /// Learner display name, snapshotted onto the certificate.
    pub user_name: String,
    pub course_title: String,
    /// Final course score in [0, 100].
    #[schema(example = 95.0)]
    pub final_score: f64,
    /// Optional expiry; omitted certificates never expire.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RevokeCertificateRequest {
    /// Reason recorded on the certificate, e.g. "academic misconduct".
    pub reason: String,
}

/// Full certificate record as returned to authenticated callers.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CertificateResponse {
    pub id: i32,
    pub certificate_id: String,
    pub verification_code: String,
    pub user_id: i32,
    pub course_id: i32,
    pub user_name: String,
    pub course_title: String,
    pub completion_date: DateTime<Utc>,
    pub final_score: f64,
    pub grade: String,
    pub document_url: String,
    pub issued_by: String,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revocation_reason: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Display subset exposed to anonymous verifiers. Deliberately excludes the
/// internal record id, the owner's user id and the document URL.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CertificateSummary {
    pub certificate_id: String,
    pub user_name: String,
    pub course_title: String,
    pub completion_date: DateTime<Utc>,
    pub grade: String,
    pub final_score: f64,
    pub issued_by: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<certificate::Model> for CertificateResponse {
    fn from(m: certificate::Model) -> Self {
        Self {
            id: m.id,
            certificate_id: m.certificate_id,
            verification_code: m.verification_code,
            user_id: m.user_id,
            course_id: m.course_id,
            user_name: m.user_name,
            course_title: m.course_title,
            completion_date: m.completion_date,
            final_score: m.final_score,
            grade: m.grade,
            document_url: m.document_url,
            issued_by: m.issued_by,
            revoked: m.revoked,
            revoked_at: m.revoked_at,
            revocation_reason: m.revocation_reason,
            expires_at: m.expires_at,
            created_at: m.created_at,
        }
    }
}

impl From<certificate::Model> for CertificateSummary {
    fn from(m: certificate::Model) -> Self {
        Self {
            certificate_id: m.certificate_id,
            user_name: m.user_name,
            course_title: m.course_title,
            completion_date: m.completion_date,
            grade: m.grade,
            final_score: m.final_score,
            issued_by: m.issued_by,
        }
    }
}

impl From<VerificationOutcome> for VerifyResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::NotFound => Self {
                is_valid: false,
                certificate: None,
                message: Some("No certificate found for this verification code".into()),
            },
            VerificationOutcome::Revoked { revoked_at, .. } => Self {
                is_valid: false,
                certificate: None,
                message: Some(match revoked_at {
                    Some(at) => format!(
                        "This certificate was revoked on {}",
                        at.format("%B %d, %Y")
                    ),
                    None => "This certificate has been revoked".into(),
                }),
            },
            VerificationOutcome::Expired { expired_at } => Self {
                is_valid: false,
                certificate: None,
                message: Some(format!(
                    "This certificate expired on {}",
                    expired_at.format("%B %d, %Y")
                )),
            },
            VerificationOutcome::Valid(model) => Self {
                is_valid: true,
                certificate: Some(CertificateSummary::from(*model)),
                message: None,
            },
        }
    }
}

pub fn validate_issue_certificate(req: &IssueCertificateRequest) -> Result<(), AppError> {
    let name = req.user_name.trim();
    if name.is_empty() || name.chars().count() > 256 {
        return Err(AppError::Validation(
            "User name must be 1-256 characters".into(),
        ));
    }
    let title = req.course_title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Course title must be 1-256 characters".into(),
        ));
    }
    if !req.final_score.is_finite() || !(0.0..=100.0).contains(&req.final_score) {
        return Err(AppError::Validation(
            "Final score must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

pub fn validate_revoke_certificate(req: &RevokeCertificateRequest) -> Result<(), AppError> {
    let reason = req.reason.trim();
    if reason.is_empty() || reason.chars().count() > 512 {
        return Err(AppError::Validation(
            "Revocation reason must be 1-512 characters".into(),
        ));
    }
    Ok(())
}
