use crate::config::ClientParams;
use crate::config::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PART_SIZE};
use crate::domain::ports::TransferEngine;
use crate::utils::error::{ObjError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTier {
    /// One request per operation.
    Standard,
    /// Large reads fan out into concurrent ranged requests.
    Accelerated,
}

/// Transfer engine backed by `aws-sdk-s3`. Every instance owns its own SDK client.
#[derive(Debug, Clone)]
pub struct S3TransferEngine {
    client: S3Client,
    bucket: String,
    tier: TransferTier,
    part_size: usize,
    max_concurrency: usize,
}

impl S3TransferEngine {
    pub fn from_params(params: &ClientParams, tier: TransferTier) -> Result<Self> {
        params.validate()?;
        let bucket = params
            .bucket()
            .ok_or_else(|| ObjError::MissingConfigError {
                field: "bucket".to_string(),
            })?
            .to_string();

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(params.region().to_string()));

        builder = match params.credentials() {
            Some((access_key, secret_key, session_token)) => {
                builder.credentials_provider(Credentials::new(
                    access_key,
                    secret_key,
                    session_token.map(str::to_string),
                    None,
                    "obj-accel-params",
                ))
            }
            None => builder.credentials_provider(
                CredentialsProviderChain::first_try(
                    "Environment",
                    EnvironmentVariableCredentialsProvider::new(),
                )
                .or_else("Profile", ProfileFileCredentialsProvider::builder().build()),
            ),
        };

        if let Some(endpoint) = params.endpoint_url() {
            builder = builder.endpoint_url(endpoint);
        }
        if let Some(virtual_addressing) = params.use_virtual_addressing() {
            builder = builder.force_path_style(!virtual_addressing);
        }
        if tier == TransferTier::Accelerated && params.use_accelerate_endpoint() {
            builder = builder.accelerate(true);
        }

        let client = S3Client::from_conf(builder.build());
        Ok(Self::from_client(client, bucket, tier)
            .with_part_size(params.part_size())
            .with_max_concurrency(params.max_concurrency()))
    }

    pub fn from_client(client: S3Client, bucket: impl Into<String>, tier: TransferTier) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            tier,
            part_size: DEFAULT_PART_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_part_size(mut self, part_size: usize) -> Self {
        self.part_size = part_size.max(1);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn tier(&self) -> TransferTier {
        self.tier
    }

    pub fn part_size(&self) -> usize {
        self.part_size
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn get_range(&self, key: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .range(range_header(offset, len))
            .send()
            .await
            .map_err(|e| {
                ObjError::transfer(format!("GetObject {}: {}", key, DisplayErrorContext(&e)))
            })?;

        let data = output.body.collect().await.map_err(|e| {
            ObjError::transfer(format!("GetObject {} body: {}", key, e))
        })?;
        Ok(data.into_bytes().to_vec())
    }

    async fn object_size(&self, key: &str) -> Result<u64> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                ObjError::transfer(format!("HeadObject {}: {}", key, DisplayErrorContext(&e)))
            })?;
        Ok(output
            .content_length()
            .and_then(|len| u64::try_from(len).ok())
            .unwrap_or(0))
    }
}

/// Inclusive HTTP byte range covering `[offset, offset + len)`.
fn range_header(offset: u64, len: usize) -> String {
    let last = offset.saturating_add(len as u64).saturating_sub(1);
    format!("bytes={}-{}", offset, last)
}

/// Splits `[offset, offset + len)` into consecutive ranges of at most `part_size` bytes.
fn split_ranges(offset: u64, len: usize, part_size: usize) -> Vec<(u64, usize)> {
    let part_size = part_size.max(1);
    let mut parts = Vec::with_capacity(len.div_ceil(part_size));
    let mut done = 0usize;
    while done < len {
        let part = part_size.min(len - done);
        parts.push((offset + done as u64, part));
        done += part;
    }
    parts
}

#[async_trait]
impl TransferEngine for S3TransferEngine {
    fn name(&self) -> &'static str {
        match self.tier {
            TransferTier::Standard => "s3",
            TransferTier::Accelerated => "s3-accel",
        }
    }

    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                ObjError::transfer(format!("PutObject {}: {}", key, DisplayErrorContext(&e)))
            })?;
        Ok(())
    }

    async fn get_object(&self, key: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        if self.tier == TransferTier::Standard || len <= self.part_size {
            return self.get_range(key, offset, len).await;
        }

        let size = self.object_size(key).await?;
        if offset >= size {
            return Err(ObjError::transfer(format!(
                "range start {} is beyond the end of {} ({} bytes)",
                offset, key, size
            )));
        }
        let available = usize::try_from(size - offset).unwrap_or(usize::MAX);
        let parts = split_ranges(offset, len.min(available), self.part_size);
        debug!(
            key = key,
            parts = parts.len(),
            concurrency = self.max_concurrency,
            "splitting ranged read"
        );

        let chunks: Vec<Vec<u8>> = stream::iter(parts)
            .map(|(start, part_len)| self.get_range(key, start, part_len))
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;
        Ok(chunks.concat())
    }

    async fn head_object(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|err| err.is_not_found()) => Ok(false),
            Err(e) => Err(ObjError::transfer(format!(
                "HeadObject {}: {}",
                key,
                DisplayErrorContext(&e)
            ))),
        }
    }
}
