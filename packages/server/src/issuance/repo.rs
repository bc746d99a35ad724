use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use thiserror::Error;

use crate::entity::certificate;

#[derive(Debug, Error)]
pub enum RepoError {
    /// The certificate identifier or verification code is already taken.
    /// The caller retries with freshly generated identifiers.
    #[error("certificate identifier or verification code already exists")]
    Duplicate,
    #[error("certificate not found")]
    NotFound,
    #[error("certificate has already been revoked")]
    AlreadyRevoked,
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Insert payload for a new certificate record.
#[derive(Debug, Clone)]
pub struct NewCertificate {
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
    pub expires_at: Option<DateTime<Utc>>,
}

/// Persistence operations for certificate records.
///
/// The store's unique indexes and conditional update are the only
/// coordination between concurrent requests; no in-process locking.
#[async_trait]
pub trait CertificateRepo: Send + Sync {
    /// Insert a record. `Duplicate` means the identifiers collided and the
    /// caller should regenerate them.
    async fn create(&self, record: NewCertificate) -> Result<certificate::Model, RepoError>;

    /// Lookup for public verification. Revoked certificates are returned so
    /// verification can report "revoked" distinctly from "never existed".
    async fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<certificate::Model>, RepoError>;

    /// A learner's certificates, most recent completion first.
    async fn find_by_owner(&self, user_id: i32) -> Result<Vec<certificate::Model>, RepoError>;

    /// Revoke a certificate by its public identifier.
    ///
    /// The revocation check and write are a single conditional UPDATE, so two
    /// concurrent revokes cannot both succeed. Prior revocation fields are
    /// never overwritten.
    async fn revoke(
        &self,
        certificate_id: &str,
        reason: &str,
    ) -> Result<certificate::Model, RepoError>;
}

/// Production repository over the injected sea-orm connection.
pub struct DbCertificateRepo {
    db: DatabaseConnection,
}

impl DbCertificateRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<certificate::Model>, RepoError> {
        Ok(certificate::Entity::find()
            .filter(certificate::Column::CertificateId.eq(certificate_id))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl CertificateRepo for DbCertificateRepo {
    async fn create(&self, record: NewCertificate) -> Result<certificate::Model, RepoError> {
        let active = certificate::ActiveModel {
            certificate_id: Set(record.certificate_id),
            verification_code: Set(record.verification_code),
            user_id: Set(record.user_id),
            course_id: Set(record.course_id),
            user_name: Set(record.user_name),
            course_title: Set(record.course_title),
            completion_date: Set(record.completion_date),
            final_score: Set(record.final_score),
            grade: Set(record.grade),
            document_url: Set(record.document_url),
            issued_by: Set(record.issued_by),
            revoked: Set(false),
            revoked_at: Set(None),
            revocation_reason: Set(None),
            expires_at: Set(record.expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match active.insert(&self.db).await {
            Ok(model) => Ok(model),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(RepoError::Duplicate),
                _ => Err(RepoError::Db(e)),
            },
        }
    }

    async fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<certificate::Model>, RepoError> {
        Ok(certificate::Entity::find()
            .filter(certificate::Column::VerificationCode.eq(code))
            .one(&self.db)
            .await?)
    }

    async fn find_by_owner(&self, user_id: i32) -> Result<Vec<certificate::Model>, RepoError> {
        Ok(certificate::Entity::find()
            .filter(certificate::Column::UserId.eq(user_id))
            .order_by_desc(certificate::Column::CompletionDate)
            .all(&self.db)
            .await?)
    }

    async fn revoke(
        &self,
        certificate_id: &str,
        reason: &str,
    ) -> Result<certificate::Model, RepoError> {
        let now = Utc::now();
        let result = certificate::Entity::update_many()
            .filter(certificate::Column::CertificateId.eq(certificate_id))
            .filter(certificate::Column::Revoked.eq(false))
            .col_expr(certificate::Column::Revoked, Expr::value(true))
            .col_expr(certificate::Column::RevokedAt, Expr::value(Some(now)))
            .col_expr(
                certificate::Column::RevocationReason,
                Expr::value(Some(reason.to_string())),
            )
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            // Distinguish "never existed" from "already revoked".
            return match self.find_by_certificate_id(certificate_id).await? {
                None => Err(RepoError::NotFound),
                Some(_) => Err(RepoError::AlreadyRevoked),
            };
        }

        self.find_by_certificate_id(certificate_id)
            .await?
            .ok_or(RepoError::NotFound)
    }
}
