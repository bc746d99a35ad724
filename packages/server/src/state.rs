use std::sync::Arc;

use crate::issuance::IssuanceService;
use crate::issuance::repo::CertificateRepo;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CertificateRepo>,
    pub issuance: Arc<IssuanceService>,
    pub jwt_secret: Arc<str>,
}
