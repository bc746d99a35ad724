use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Object store selection. The filesystem backend is intended for local
/// development; production uses S3.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Filesystem,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// S3 bucket name (s3 backend).
    pub bucket: Option<String>,
    /// S3 region (s3 backend).
    pub region: Option<String>,
    /// Custom S3 endpoint for MinIO-style deployments (s3 backend).
    pub endpoint: Option<String>,
    /// Local directory holding objects (filesystem backend).
    pub root_dir: Option<String>,
    /// Stable URL prefix under which uploaded objects are reachable.
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IssuanceConfig {
    /// Platform name printed on certificates and stored as `issued_by`.
    pub issuer_name: String,
    pub signatory_name: String,
    pub signatory_role: String,
    /// Per-attempt deadline for the object store write.
    pub upload_timeout_ms: u64,
    /// Additional upload attempts after the first failure.
    pub upload_max_retries: u8,
    pub upload_backoff_base_ms: u64,
    pub upload_backoff_max_ms: u64,
    /// Identifier regeneration attempts on duplicate-key collisions.
    pub id_max_attempts: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub issuance: IssuanceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.root_dir", "./objects")?
            .set_default("storage.public_base_url", "http://127.0.0.1:3000/files")?
            .set_default("issuance.issuer_name", "Hire & Learn")?
            .set_default("issuance.signatory_name", "Program Director")?
            .set_default("issuance.signatory_role", "Director of Education")?
            .set_default("issuance.upload_timeout_ms", 5000)?
            .set_default("issuance.upload_max_retries", 3)?
            .set_default("issuance.upload_backoff_base_ms", 250)?
            .set_default("issuance.upload_backoff_max_ms", 5000)?
            .set_default("issuance.id_max_attempts", 3)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., HIRELEARN__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("HIRELEARN").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
