use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

/// The external image-hosting service: takes a binary, hands back a durable
/// object key.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores an image under `key` and returns the key on success.
    async fn put_image(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    async fn image_exists(&self, key: &str) -> Result<bool>;
}

pub struct S3ImageStore {
    client: Client,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put_image(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;
        Ok(key.to_string())
    }

    async fn image_exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }
}
