//! src/storage/s3.rs
use crate::configuration::StorageSettings;
use crate::storage::{ObjectStore, StoreError};
use anyhow::Context;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::Config;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use secrecy::ExposeSecret;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    #[tracing::instrument(name = "Create S3Storage handle", skip_all)]
    pub fn new(settings: &StorageSettings) -> Self {
        let creds = Credentials::new(
            settings.aws_access_key_id.clone(),
            settings.aws_secret_key.expose_secret(),
            None,
            None,
            "mini-mapreduce",
        );

        let config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(creds)
            .region(Region::new(settings.aws_region.clone()))
            .endpoint_url(settings.aws_endpoint_url.clone())
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(config),
        }
    }

    /// Creates `bucket` unless this account already owns it.
    #[tracing::instrument(name = "Ensure bucket", skip(self))]
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), anyhow::Error> {
        match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => {
                tracing::debug!("Created bucket: {}", bucket);
                Ok(())
            }
            Err(err) => {
                if let Some(e) = err.as_service_error() {
                    if e.is_bucket_already_owned_by_you() {
                        return Ok(());
                    }
                    if e.is_bucket_already_exists() {
                        return Err(anyhow::anyhow!("Bucket {} is owned by another account", bucket));
                    }
                }
                Err(anyhow::anyhow!("Failed to create bucket: {}", err))
            }
        }
    }

    #[tracing::instrument(name = "List", skip(self))]
    pub async fn list(&self, bucket: &str) -> Result<Vec<String>, anyhow::Error> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .context("Failed to list bucket objects")?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(String::from))
            .collect();
        Ok(keys)
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Storage {
    #[tracing::instrument(name = "Get object", skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let object = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(object) => object,
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_key())
                {
                    return Err(StoreError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                return Err(anyhow::Error::new(err)
                    .context("Failed to get object output stream")
                    .into());
            }
        };

        let data = object
            .body
            .collect()
            .await
            .context("Failed to read from S3 download stream")?
            .into_bytes();
        Ok(data.to_vec())
    }

    #[tracing::instrument(name = "Put object", skip(self, data), fields(size = data.len()))]
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .context("Failed to put object")?;
        Ok(())
    }
}
