use chrono::{DateTime, Utc};

use crate::entity::certificate;

use super::repo::{CertificateRepo, RepoError};

/// Outcome of a public verification lookup.
///
/// All four cases are normal results, never errors: a revoked or expired
/// certificate is reported as such, distinctly from one that never existed.
#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    NotFound,
    Revoked {
        revoked_at: Option<DateTime<Utc>>,
        reason: Option<String>,
    },
    Expired {
        expired_at: DateTime<Utc>,
    },
    Valid(Box<certificate::Model>),
}

/// Look up a verification code and classify the certificate's standing.
pub async fn verify_code(
    repo: &dyn CertificateRepo,
    code: &str,
) -> Result<VerificationOutcome, RepoError> {
    let Some(model) = repo.find_by_verification_code(code).await? else {
        return Ok(VerificationOutcome::NotFound);
    };

    if model.revoked {
        return Ok(VerificationOutcome::Revoked {
            revoked_at: model.revoked_at,
            reason: model.revocation_reason,
        });
    }

    if let Some(expires_at) = model.expires_at
        && expires_at <= Utc::now()
    {
        return Ok(VerificationOutcome::Expired {
            expired_at: expires_at,
        });
    }

    Ok(VerificationOutcome::Valid(Box::new(model)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::issuance::repo::NewCertificate;
    use crate::issuance::repo::memory::MemoryCertificateRepo;

    use super::*;

    fn record(code: &str, expires_at: Option<DateTime<Utc>>) -> NewCertificate {
        NewCertificate {
            certificate_id: format!("CERT-20260829120000-{}", &code[..6]),
            verification_code: code.to_string(),
            user_id: 1,
            course_id: 2,
            user_name: "Ada Lovelace".into(),
            course_title: "Intro to Algorithms".into(),
            completion_date: Utc::now(),
            final_score: 95.0,
            grade: "Distinction".into(),
            document_url: "mem://certificates/x.pdf".into(),
            issued_by: "Hire & Learn".into(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let repo = Arc::new(MemoryCertificateRepo::new());
        let outcome = verify_code(repo.as_ref(), "NOSUCHCODE12").await.unwrap();
        assert!(matches!(outcome, VerificationOutcome::NotFound));
    }

    #[tokio::test]
    async fn active_certificate_is_valid() {
        let repo = MemoryCertificateRepo::new();
        repo.create(record("VALIDCODE123", None)).await.unwrap();

        let outcome = verify_code(&repo, "VALIDCODE123").await.unwrap();
        match outcome {
            VerificationOutcome::Valid(model) => {
                assert_eq!(model.user_name, "Ada Lovelace");
                assert_eq!(model.grade, "Distinction");
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn revoked_certificate_reports_revoked_not_missing() {
        let repo = MemoryCertificateRepo::new();
        let model = repo.create(record("REVOKEDCODE1", None)).await.unwrap();
        repo.revoke(&model.certificate_id, "academic misconduct")
            .await
            .unwrap();

        let outcome = verify_code(&repo, "REVOKEDCODE1").await.unwrap();
        match outcome {
            VerificationOutcome::Revoked { reason, revoked_at } => {
                assert_eq!(reason.as_deref(), Some("academic misconduct"));
                assert!(revoked_at.is_some());
            }
            other => panic!("expected Revoked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn past_expiry_reports_expired() {
        let repo = MemoryCertificateRepo::new();
        let expired_at = Utc::now() - chrono::Duration::days(1);
        repo.create(record("EXPIREDCODE1", Some(expired_at)))
            .await
            .unwrap();

        let outcome = verify_code(&repo, "EXPIREDCODE1").await.unwrap();
        assert!(matches!(outcome, VerificationOutcome::Expired { .. }));
    }

    #[tokio::test]
    async fn future_expiry_is_still_valid() {
        let repo = MemoryCertificateRepo::new();
        let expires_at = Utc::now() + chrono::Duration::days(365);
        repo.create(record("FUTURECODE12", Some(expires_at)))
            .await
            .unwrap();

        let outcome = verify_code(&repo, "FUTURECODE12").await.unwrap();
        assert!(matches!(outcome, VerificationOutcome::Valid(_)));
    }

    #[tokio::test]
    async fn double_revoke_is_rejected_and_preserves_first_revocation() {
        let repo = MemoryCertificateRepo::new();
        let model = repo.create(record("DOUBLEREVOKE", None)).await.unwrap();

        repo.revoke(&model.certificate_id, "first reason").await.unwrap();
        let err = repo
            .revoke(&model.certificate_id, "second reason")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::AlreadyRevoked));

        let stored = repo
            .find_by_verification_code("DOUBLEREVOKE")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.revocation_reason.as_deref(), Some("first reason"));
    }
}
