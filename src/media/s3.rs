use crate::config::MediaConfig;
use crate::error::{AppError, Result};
use crate::media::MediaStore;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct S3MediaStore {
    client: Client,
    bucket: String,
    region: String,
    public_base_url: Option<String>,
}

/// Builds the S3 client from config, honoring custom endpoints and static
/// credentials for MinIO-style deployments.
pub async fn init_client(config: &MediaConfig) -> Client {
    let region = aws_config::Region::new(config.region.clone());
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(aws_credential_types::Credentials::new(
            access_key, secret_key, None, None, "static",
        ));
    }

    let shared_config = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&shared_config).force_path_style(config.force_path_style);
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }

    Client::from_conf(builder.build())
}

impl S3MediaStore {
    #[must_use]
    pub fn new(client: Client, config: &MediaConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        self.public_base_url.as_ref().map_or_else(
            || format!("https://{}.s3.{}.amazonaws.com/{key}", self.bucket, self.region),
            |base| format!("{}/{key}", base.trim_end_matches('/')),
        )
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    #[tracing::instrument(err(level = "warn"), skip(self, bytes), fields(size = bytes.len()))]
    async fn store(&self, bytes: Bytes, content_type: &str, hint: &str) -> Result<String> {
        let key = object_key(hint, content_type);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, key = %key, "S3 upload failed");
                AppError::MediaUpload
            })?;

        tracing::debug!(key = %key, "Image uploaded");
        Ok(self.object_url(&key))
    }

    async fn check(&self) -> Result<()> {
        self.client.head_bucket().bucket(&self.bucket).send().await.map_err(|e| {
            tracing::warn!(error = ?e, bucket = %self.bucket, "S3 head_bucket failed");
            AppError::Internal
        })?;
        Ok(())
    }
}

/// `items/{sanitized-hint}_{uuid}.{ext}` — the random suffix makes same-title
/// uploads collision-free.
fn object_key(hint: &str, content_type: &str) -> String {
    let slug: String = hint
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .take(48)
        .collect();
    let slug = if slug.is_empty() { "item".to_string() } else { slug };

    format!("items/{slug}_{}.{}", Uuid::new_v4(), extension_for(content_type))
}

fn extension_for(content_type: &str) -> &str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_sanitizes_hint() {
        let key = object_key("Calc Textbook (3rd ed.)", "image/png");
        assert!(key.starts_with("items/calc_textbook__3rd_ed__"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_object_key_empty_hint_falls_back() {
        let key = object_key("", "image/jpeg");
        assert!(key.starts_with("items/item_"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_object_keys_are_unique() {
        assert_ne!(object_key("desk", "image/png"), object_key("desk", "image/png"));
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(extension_for("image/x-unknown"), "bin");
    }
}
