//! Object storage for album pictures
//!
//! Objects are addressed by `"{user_id}/{YYYY-MM-DD}/{filename}"` keys and are
//! publicly readable once uploaded. [`S3Store`] talks to Amazon S3;
//! [`MemoryStore`] keeps everything in process for tests and local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use chrono::{DateTime, Utc};
use common::{env, error::ConfigError};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::models::ObjectInfo;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object {0} not found")]
    NotFound(String),

    #[error("object store error: {0}")]
    Backend(String),
}

/// Public URL of an object in a bucket
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every object whose key starts with `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError>;

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Store `body` under `key` with a public-read ACL
    async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str)
    -> Result<(), StorageError>;

    fn public_url(&self, key: &str) -> String;
}

/// S3 connection settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket_name: String,
}

impl StorageConfig {
    /// Read `AWS_ACCESS_KEY`, `AWS_SECRET_KEY`, `AWS_REGION` and
    /// `AWS_BUCKET_NAME`; all are required
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(StorageConfig {
            access_key: env::required("AWS_ACCESS_KEY")?,
            secret_key: env::required("AWS_SECRET_KEY")?,
            region: env::required("AWS_REGION")?,
            bucket_name: env::required("AWS_BUCKET_NAME")?,
        })
    }
}

/// Amazon S3 backed store
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

fn backend<E: std::error::Error>(err: E) -> StorageError {
    StorageError::Backend(DisplayErrorContext(err).to_string())
}

impl S3Store {
    /// Build a client with static credentials for the configured region
    pub async fn connect(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "environment",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        info!(
            "S3 store ready for bucket {} in {}",
            config.bucket_name, config.region
        );

        Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket_name.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                error!("Failed to list {} in {}: {}", prefix, self.bucket, e);
                backend(e)
            })?;

            for obj in response.contents() {
                let Some(key) = obj.key() else {
                    continue;
                };

                let last_modified = obj
                    .last_modified()
                    .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
                    .unwrap_or_else(Utc::now);

                objects.push(ObjectInfo {
                    key: key.to_string(),
                    size: obj.size().unwrap_or(0).max(0) as u64,
                    last_modified,
                });
            }

            if response.is_truncated().unwrap_or(false) {
                continuation_token = response.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|err| err.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    backend(e)
                }
            })?;

        let body = output.body.collect().await.map_err(backend)?;
        Ok(body.into_bytes().to_vec())
    }

    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload {}: {}", key, e);
                backend(e)
            })?;

        info!("Uploaded {}", key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.bucket, key)
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Process-local object store
#[derive(Debug)]
pub struct MemoryStore {
    bucket: String,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Content type an object was uploaded with
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectInfo {
                key: key.clone(),
                size: object.body.len() as u64,
                last_modified: object.last_modified,
            })
            .collect())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.bucket, key)
    }
}
