use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::retry::calculate_backoff;
use common::storage::{ObjectStore, StorageError};
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{info, instrument, warn};

use crate::config::IssuanceConfig;
use crate::entity::certificate;

use super::grade::Grade;
use super::ids;
use super::layout::{CertificateDisplayData, certificate_layout};
use super::renderer::{CertificateRenderer, RenderError};
use super::repo::{CertificateRepo, NewCertificate, RepoError};

#[derive(Debug, Error)]
pub enum IssueError {
    /// Caller error; rejected immediately, never retried.
    #[error("final score must be a finite number in [0, 100], got {0}")]
    InvalidScore(f64),
    /// A template or data bug; permanent, never retried.
    #[error("failed to render certificate document")]
    Render(#[from] RenderError),
    /// The object store stayed unreachable through the retry window.
    #[error("document upload failed after {attempts} attempts")]
    Upload {
        attempts: u8,
        #[source]
        cause: StorageError,
    },
    /// Freshly generated identifiers kept colliding; practically unreachable.
    #[error("could not assign unique identifiers after {attempts} attempts")]
    IdentifiersExhausted { attempts: u8 },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Issuing-authority metadata printed on every certificate.
#[derive(Debug, Clone)]
pub struct IssuerInfo {
    pub name: String,
    pub signatory_name: String,
    pub signatory_role: String,
}

/// Retry bounds for the fallible stages. The orchestrator is the only
/// component that retries anything; the leaves fail fast.
#[derive(Debug, Clone)]
pub struct IssuancePolicy {
    pub upload_timeout: Duration,
    pub upload_max_retries: u8,
    pub upload_backoff_base_ms: u64,
    pub upload_backoff_max_ms: u64,
    pub id_max_attempts: u8,
}

impl From<&IssuanceConfig> for IssuerInfo {
    fn from(cfg: &IssuanceConfig) -> Self {
        Self {
            name: cfg.issuer_name.clone(),
            signatory_name: cfg.signatory_name.clone(),
            signatory_role: cfg.signatory_role.clone(),
        }
    }
}

impl From<&IssuanceConfig> for IssuancePolicy {
    fn from(cfg: &IssuanceConfig) -> Self {
        Self {
            upload_timeout: Duration::from_millis(cfg.upload_timeout_ms),
            upload_max_retries: cfg.upload_max_retries,
            upload_backoff_base_ms: cfg.upload_backoff_base_ms,
            upload_backoff_max_ms: cfg.upload_backoff_max_ms,
            id_max_attempts: cfg.id_max_attempts,
        }
    }
}

/// Course-completion trigger payload.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub user_id: i32,
    pub course_id: i32,
    pub user_name: String,
    pub course_title: String,
    pub final_score: f64,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Coordinates grade -> identifiers -> render -> upload -> persist.
///
/// A record is only ever inserted after its document URL has been confirmed
/// by the store, so a certificate can never point at an unconfirmed upload.
pub struct IssuanceService {
    repo: Arc<dyn CertificateRepo>,
    store: Arc<dyn ObjectStore>,
    renderer: Arc<dyn CertificateRenderer>,
    issuer: IssuerInfo,
    policy: IssuancePolicy,
}

impl IssuanceService {
    pub fn new(
        repo: Arc<dyn CertificateRepo>,
        store: Arc<dyn ObjectStore>,
        renderer: Arc<dyn CertificateRenderer>,
        issuer: IssuerInfo,
        policy: IssuancePolicy,
    ) -> Self {
        Self {
            repo,
            store,
            renderer,
            issuer,
            policy,
        }
    }

    /// Deterministic object key, so a re-upload under the same identifier
    /// overwrites rather than duplicates.
    fn object_key(certificate_id: &str) -> String {
        format!("certificates/{certificate_id}.pdf")
    }

    #[instrument(skip(self, req), fields(user_id = req.user_id, course_id = req.course_id))]
    pub async fn issue(&self, req: IssueRequest) -> Result<certificate::Model, IssueError> {
        let grade = Grade::from_score(req.final_score).map_err(IssueError::InvalidScore)?;
        let completion_date = Utc::now();

        let max_attempts = self.policy.id_max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let certificate_id = ids::certificate_id();
            let verification_code = ids::verification_code();

            let display = CertificateDisplayData {
                user_name: req.user_name.clone(),
                course_title: req.course_title.clone(),
                grade,
                final_score: req.final_score,
                completion_date,
                certificate_id: certificate_id.clone(),
                verification_code: verification_code.clone(),
                issuer_name: self.issuer.name.clone(),
                signatory_name: self.issuer.signatory_name.clone(),
                signatory_role: self.issuer.signatory_role.clone(),
            };

            let layout = certificate_layout(&display);
            let document = self.renderer.render(&layout)?;

            let key = Self::object_key(&certificate_id);
            let document_url = self.upload_with_retry(&key, &document).await?;

            let record = NewCertificate {
                certificate_id: certificate_id.clone(),
                verification_code,
                user_id: req.user_id,
                course_id: req.course_id,
                user_name: req.user_name.clone(),
                course_title: req.course_title.clone(),
                completion_date,
                final_score: req.final_score,
                grade: grade.label().to_string(),
                document_url,
                issued_by: self.issuer.name.clone(),
                expires_at: req.expires_at,
            };

            match self.repo.create(record).await {
                Ok(model) => {
                    info!(certificate_id = %model.certificate_id, "certificate issued");
                    return Ok(model);
                }
                Err(RepoError::Duplicate) => {
                    // The document under the stale key is orphaned, which is a
                    // recoverable condition; the record must reference the key
                    // of the identifiers it actually carries.
                    warn!(attempt, certificate_id, "identifier collision; regenerating");
                    continue;
                }
                Err(e) => return Err(IssueError::Repo(e)),
            }
        }

        Err(IssueError::IdentifiersExhausted {
            attempts: max_attempts,
        })
    }

    /// One-attempt store writes wrapped in the bounded backoff-and-timeout
    /// loop. A per-attempt timeout is treated exactly like an upload failure.
    async fn upload_with_retry(&self, key: &str, data: &[u8]) -> Result<String, IssueError> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let result = timeout(
                self.policy.upload_timeout,
                self.store.put(key, data, "application/pdf"),
            )
            .await;

            let cause = match result {
                Ok(Ok(url)) => return Ok(url),
                Ok(Err(e)) => e,
                Err(_) => StorageError::Timeout(self.policy.upload_timeout),
            };

            if attempt > self.policy.upload_max_retries {
                return Err(IssueError::Upload { attempts: attempt, cause });
            }

            let delay = calculate_backoff(
                attempt,
                self.policy.upload_backoff_base_ms,
                self.policy.upload_backoff_max_ms,
            );
            warn!(
                attempt,
                error = %cause,
                delay_ms = delay.as_millis() as u64,
                "certificate upload failed; backing off"
            );
            sleep(delay).await;
        }
    }
}
