use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use common::storage::ObjectStore;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::s3::S3ObjectStore;
use tracing::{Level, info};

use server::config::{AppConfig, StorageBackend};
use server::issuance::IssuanceService;
use server::issuance::renderer::PdfRenderer;
use server::issuance::repo::{CertificateRepo, DbCertificateRepo};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("failed to initialize database")?;

    let store: Arc<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::S3 => {
            let bucket = config
                .storage
                .bucket
                .as_deref()
                .context("storage.bucket is required for the s3 backend")?;
            let region = config
                .storage
                .region
                .as_deref()
                .context("storage.region is required for the s3 backend")?;
            Arc::new(S3ObjectStore::new(
                bucket,
                region,
                config.storage.endpoint.as_deref(),
                &config.storage.public_base_url,
            )?)
        }
        StorageBackend::Filesystem => {
            let root = config
                .storage
                .root_dir
                .as_deref()
                .context("storage.root_dir is required for the filesystem backend")?;
            Arc::new(
                FilesystemObjectStore::new(
                    PathBuf::from(root),
                    &config.storage.public_base_url,
                )
                .await?,
            )
        }
    };

    // Fonts are probed at startup so a misconfigured host fails fast.
    let renderer = Arc::new(PdfRenderer::discover()?);

    let repo: Arc<dyn CertificateRepo> = Arc::new(DbCertificateRepo::new(db));
    let issuance = Arc::new(IssuanceService::new(
        repo.clone(),
        store,
        renderer,
        (&config.issuance).into(),
        (&config.issuance).into(),
    ));

    let state = AppState {
        repo,
        issuance,
        jwt_secret: config.auth.jwt_secret.as_str().into(),
    };

    let app = server::build_router(state, &config.server.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host/server.port")?;
    info!("Certificate service listening at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
