use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::storage::{ObjectStore, StorageError};
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::Client;
use serde_json::Value;

use server::config::CorsConfig;
use server::entity::certificate;
use server::issuance::IssuanceService;
use server::issuance::layout::DocumentLayout;
use server::issuance::renderer::{CertificateRenderer, RenderError};
use server::issuance::repo::{CertificateRepo, NewCertificate, RepoError};
use server::issuance::service::{IssuancePolicy, IssuerInfo};
use server::state::AppState;
use server::utils::jwt::Claims;

const JWT_SECRET: &str = "integration-test-secret";

/// Repository backed by a Vec, honoring the same uniqueness and
/// conditional-revoke semantics as the sea-orm implementation.
#[derive(Default)]
struct InMemoryRepo {
    records: Mutex<Vec<certificate::Model>>,
}

#[async_trait]
impl CertificateRepo for InMemoryRepo {
    async fn create(&self, record: NewCertificate) -> Result<certificate::Model, RepoError> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|m| {
            m.certificate_id == record.certificate_id
                || m.verification_code == record.verification_code
        }) {
            return Err(RepoError::Duplicate);
        }
        let model = certificate::Model {
            id: records.len() as i32 + 1,
            certificate_id: record.certificate_id,
            verification_code: record.verification_code,
            user_id: record.user_id,
            course_id: record.course_id,
            user_name: record.user_name,
            course_title: record.course_title,
            completion_date: record.completion_date,
            final_score: record.final_score,
            grade: record.grade,
            document_url: record.document_url,
            issued_by: record.issued_by,
            revoked: false,
            revoked_at: None,
            revocation_reason: None,
            expires_at: record.expires_at,
            created_at: Utc::now(),
        };
        records.push(model.clone());
        Ok(model)
    }

    async fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<certificate::Model>, RepoError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.verification_code == code)
            .cloned())
    }

    async fn find_by_owner(&self, user_id: i32) -> Result<Vec<certificate::Model>, RepoError> {
        let mut matches: Vec<certificate::Model> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.completion_date.cmp(&a.completion_date));
        Ok(matches)
    }

    async fn revoke(
        &self,
        certificate_id: &str,
        reason: &str,
    ) -> Result<certificate::Model, RepoError> {
        let mut records = self.records.lock().unwrap();
        let Some(model) = records
            .iter_mut()
            .find(|m| m.certificate_id == certificate_id)
        else {
            return Err(RepoError::NotFound);
        };
        if model.revoked {
            return Err(RepoError::AlreadyRevoked);
        }
        model.revoked = true;
        model.revoked_at = Some(Utc::now());
        model.revocation_reason = Some(reason.to_string());
        Ok(model.clone())
    }
}

#[derive(Default)]
struct InMemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        Ok(format!("http://store.test/{key}"))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }
}

/// Renders the layout's text content instead of a real PDF, so the suite
/// needs no fonts on the host.
struct TextRenderer;

impl CertificateRenderer for TextRenderer {
    fn render(&self, layout: &DocumentLayout) -> Result<Vec<u8>, RenderError> {
        Ok(layout.text_contents().join("\n").into_bytes())
    }
}

pub struct TestResponse {
    pub status: u16,
    pub body: Value,
    pub text: String,
}

/// A running application instance bound to an ephemeral port.
pub struct TestApp {
    pub address: String,
    client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let repo: Arc<dyn CertificateRepo> = Arc::new(InMemoryRepo::default());
        let issuance = Arc::new(IssuanceService::new(
            repo.clone(),
            Arc::new(InMemoryStore::default()),
            Arc::new(TextRenderer),
            IssuerInfo {
                name: "Hire & Learn".into(),
                signatory_name: "Grace Hopper".into(),
                signatory_role: "Director of Education".into(),
            },
            IssuancePolicy {
                upload_timeout: Duration::from_secs(1),
                upload_max_retries: 1,
                upload_backoff_base_ms: 0,
                upload_backoff_max_ms: 0,
                id_max_attempts: 3,
            },
        ));
        let state = AppState {
            repo,
            issuance,
            jwt_secret: JWT_SECRET.into(),
        };
        let cors = CorsConfig {
            allow_origins: vec![],
            max_age: 3600,
        };
        let app = server::build_router(state, &cors);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            address: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    /// Mint a token the way the platform's identity service would.
    pub fn token(&self, user_id: i32, permissions: &[&str]) -> String {
        let claims = Claims {
            sub: format!("user-{user_id}"),
            uid: user_id,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> TestResponse {
        let mut req = self.client.post(format!("{}{path}", self.address)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Self::read(req.send().await.unwrap()).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut req = self.client.get(format!("{}{path}", self.address));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Self::read(req.send().await.unwrap()).await
    }

    async fn read(res: reqwest::Response) -> TestResponse {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        TestResponse { status, body, text }
    }
}
