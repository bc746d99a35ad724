use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An issued course-completion credential.
///
/// Immutable after insert except for the revocation fields, which are set
/// exactly once by the revoke operation. The unique indexes on
/// `certificate_id` and `verification_code` are the only cross-request
/// coordination for concurrent issuance.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "certificate")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Human-traceable identifier, e.g. `CERT-20260829143055-7KQ2XN`.
    #[sea_orm(unique)]
    pub certificate_id: String,

    /// Public token third parties use to validate authenticity.
    #[sea_orm(unique)]
    pub verification_code: String,

    pub user_id: i32,
    pub course_id: i32,

    /// Snapshots taken at issuance so the certificate stays renderable even
    /// if the user or course record changes later.
    pub user_name: String,
    pub course_title: String,

    pub completion_date: DateTimeUtc,
    #[sea_orm(column_type = "Double")]
    pub final_score: f64,
    /// Grade label derived from the final score.
    pub grade: String,

    /// URL of the rendered PDF in the object store. A dangling URL is a
    /// recoverable condition, not a foreign key.
    pub document_url: String,

    pub issued_by: String,

    pub revoked: bool,
    pub revoked_at: Option<DateTimeUtc>,
    pub revocation_reason: Option<String>,

    pub expires_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
