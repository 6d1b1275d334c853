use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

pub mod s3;

pub use s3::S3MediaStore;

/// Capability for durably storing item images with a third-party host.
/// `store` returns a public URL for the uploaded bytes; `check` is the
/// readiness probe.
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    async fn store(&self, bytes: Bytes, content_type: &str, hint: &str) -> Result<String>;
    async fn check(&self) -> Result<()>;
}

impl std::fmt::Debug for dyn MediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MediaStore")
    }
}
