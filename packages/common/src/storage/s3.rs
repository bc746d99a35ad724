use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use super::error::StorageError;
use super::traits::ObjectStore;
use super::validate_key;

/// S3-backed object store.
///
/// Performs exactly one request per call; the caller owns retry policy.
/// `public_base_url` is the stable prefix under which uploaded objects are
/// reachable (bucket website, CDN, or reverse proxy).
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(
        bucket_name: &str,
        region: &str,
        endpoint: Option<&str>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let region = match endpoint {
            Some(endpoint) => Region::Custom {
                region: region.to_string(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => region
                .parse()
                .map_err(|e| StorageError::Provider(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::default()
            .map_err(|e| StorageError::Provider(format!("credentials: {e}")))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Provider(e.to_string()))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    fn map_err(err: S3Error) -> StorageError {
        match err {
            S3Error::HttpFailWithBody(status, body) => StorageError::Upload {
                status,
                message: body,
            },
            other => StorageError::Provider(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        validate_key(key)?;

        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(Self::map_err)?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Upload {
                status,
                message: String::from_utf8_lossy(response.bytes()).into_owned(),
            });
        }

        Ok(self.object_url(key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        match self.bucket.get_object(key).await {
            Ok(response) => Ok(response.bytes().to_vec()),
            Err(S3Error::HttpFailWithBody(404, _)) => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(Self::map_err(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        match self.bucket.head_object(key).await {
            Ok((_, status)) if (200..300).contains(&status) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => Err(StorageError::Upload {
                status,
                message: "unexpected HEAD status".into(),
            }),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(Self::map_err(e)),
        }
    }
}
