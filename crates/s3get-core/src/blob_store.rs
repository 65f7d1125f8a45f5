//! Object Probe and Range Fetcher's external collaborator (spec.md §4.1,
//! §4.3, §6): the pipeline only ever calls this trait, never the AWS SDK
//! directly, so it can be swapped for a test double.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use crate::error::{FetchCause, ProbeError};

/// A parsed `s3://bucket/key` source URI.
#[derive(Debug, Clone)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

/// Parses `s3://bucket/key`. The only URI shape this crate accepts (spec.md
/// §1: "argument parsing library internals" and general URI handling are
/// out of scope beyond this one form).
pub fn parse_uri(uri: &str) -> Result<ObjectLocation, ProbeError> {
    let rest = uri
        .strip_prefix("s3://")
        .ok_or_else(|| ProbeError::MalformedUri(uri.to_string()))?;
    let (bucket, key) = rest
        .split_once('/')
        .ok_or_else(|| ProbeError::MalformedUri(uri.to_string()))?;
    if bucket.is_empty() || key.is_empty() {
        return Err(ProbeError::MalformedUri(uri.to_string()));
    }
    Ok(ObjectLocation {
        bucket: bucket.to_string(),
        key: key.to_string(),
    })
}

/// The Object Probe and Range Fetcher, abstracted behind a trait so the
/// pipeline (segmenter, admission, supervisor) never depends on
/// `aws-sdk-s3` directly (spec.md §4.1, §4.3).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Object Probe: total object size in bytes (spec.md §4.1).
    async fn object_size(&self, location: &ObjectLocation) -> Result<u64, ProbeError>;

    /// Range Fetcher: bytes in the inclusive range `[first_byte, last_byte]`
    /// (spec.md §4.3). No retry — a single failure here is terminal for the
    /// whole transfer.
    async fn fetch_range(
        &self,
        location: &ObjectLocation,
        first_byte: u64,
        last_byte: u64,
    ) -> Result<Bytes, FetchCause>;
}

/// Production `BlobStore`, backed by the real S3 API.
pub struct S3BlobStore {
    client: S3Client,
}

impl S3BlobStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default credential/region provider chain
    /// (spec.md §6: "inherits credentials... from the external blob-store
    /// client" — endpoint and credential configuration are not this
    /// project's concern).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(S3Client::new(&config))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn object_size(&self, location: &ObjectLocation) -> Result<u64, ProbeError> {
        let head = self
            .client
            .head_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_not_found())
                {
                    ProbeError::NotFound(format!("s3://{}/{}", location.bucket, location.key))
                } else {
                    ProbeError::Other(anyhow::anyhow!(err.to_string()))
                }
            })?;
        Ok(head.content_length().unwrap_or(0) as u64)
    }

    async fn fetch_range(
        &self,
        location: &ObjectLocation,
        first_byte: u64,
        last_byte: u64,
    ) -> Result<Bytes, FetchCause> {
        let resp = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .range(format!("bytes={}-{}", first_byte, last_byte))
            .send()
            .await
            .map_err(|err| FetchCause::Transport(anyhow::anyhow!(err.to_string())))?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|err| FetchCause::Transport(anyhow::anyhow!(err.to_string())))?;
        Ok(body.into_bytes())
    }
}
