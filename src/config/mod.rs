#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};

use crate::domain::model::{ClientVariant, VendorId};
use crate::utils::error::{ObjError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const BUCKET: &str = "bucket";
pub const REGION: &str = "region";
pub const ENDPOINT_OVERRIDE: &str = "endpoint_override";
pub const SCHEME: &str = "scheme";
pub const ACCESS_KEY: &str = "access_key";
pub const SECRET_KEY: &str = "secret_key";
pub const SESSION_TOKEN: &str = "session_token";
pub const USE_VIRTUAL_ADDRESSING: &str = "use_virtual_addressing";
pub const ACCELERATED: &str = "accelerated";
pub const ACCEL_TYPE: &str = "accel_type";
pub const USE_ACCELERATE_ENDPOINT: &str = "use_accelerate_endpoint";
pub const PART_SIZE: &str = "part_size";
pub const MAX_CONCURRENCY: &str = "max_concurrency";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_PART_SIZE: usize = 8 * 1024 * 1024;
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

const MIN_PART_SIZE: usize = 64 * 1024;
const MAX_PART_SIZE: usize = 5 * 1024 * 1024 * 1024;

/// Scalar accepted in parameter files; everything is kept as text in the bag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Float(f64),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Text(text) => text,
            RawValue::Flag(flag) => flag.to_string(),
            RawValue::Integer(number) => number.to_string(),
            RawValue::Float(number) => number.to_string(),
        }
    }
}

impl From<HashMap<String, RawValue>> for ClientParams {
    fn from(raw: HashMap<String, RawValue>) -> Self {
        Self {
            values: raw
                .into_iter()
                .map(|(key, value)| (key, value.into_text()))
                .collect(),
        }
    }
}

impl From<ClientParams> for HashMap<String, String> {
    fn from(params: ClientParams) -> Self {
        params.values
    }
}

/// Key/value bag supplying endpoint, credentials and tuning to the client variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, RawValue>",
    into = "HashMap<String, String>"
)]
pub struct ClientParams {
    values: HashMap<String, String>,
}

impl ClientParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a `.json` file as JSON and anything else as TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Applies a `key=value` override.
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.set(key.trim(), value.trim());
                Ok(())
            }
            _ => Err(ObjError::InvalidConfigValueError {
                field: "param".to_string(),
                value: assignment.to_string(),
                reason: "Expected key=value".to_string(),
            }),
        }
    }

    pub fn bucket(&self) -> Option<&str> {
        self.get(BUCKET)
    }

    pub fn region(&self) -> &str {
        self.get(REGION).unwrap_or(DEFAULT_REGION)
    }

    pub fn scheme(&self) -> &str {
        self.get(SCHEME).unwrap_or(DEFAULT_SCHEME)
    }

    /// Endpoint override as a full URL; a bare host gets the configured scheme.
    pub fn endpoint_url(&self) -> Option<String> {
        self.get(ENDPOINT_OVERRIDE).map(|endpoint| {
            if endpoint.contains("://") {
                endpoint.to_string()
            } else {
                format!("{}://{}", self.scheme(), endpoint)
            }
        })
    }

    /// Static credentials as (access key, secret key, session token), when both keys are set.
    pub fn credentials(&self) -> Option<(&str, &str, Option<&str>)> {
        match (self.get(ACCESS_KEY), self.get(SECRET_KEY)) {
            (Some(access), Some(secret)) => Some((access, secret, self.get(SESSION_TOKEN))),
            _ => None,
        }
    }

    pub fn use_virtual_addressing(&self) -> Option<bool> {
        self.get(USE_VIRTUAL_ADDRESSING)
            .and_then(validation::parse_flag)
    }

    pub fn accelerated(&self) -> bool {
        self.get(ACCELERATED)
            .and_then(validation::parse_flag)
            .unwrap_or(false)
    }

    pub fn use_accelerate_endpoint(&self) -> bool {
        self.get(USE_ACCELERATE_ENDPOINT)
            .and_then(validation::parse_flag)
            .unwrap_or(false)
    }

    pub fn part_size(&self) -> usize {
        self.get(PART_SIZE)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_PART_SIZE)
    }

    pub fn max_concurrency(&self) -> usize {
        self.get(MAX_CONCURRENCY)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_CONCURRENCY)
    }

    /// Variant selected by the `accelerated` and `accel_type` tags.
    ///
    /// A vendor tag implies the accelerated tier.
    pub fn variant(&self) -> Result<ClientVariant> {
        match self.get(ACCEL_TYPE) {
            Some(tag) => VendorId::parse(tag)
                .map(ClientVariant::Vendor)
                .ok_or_else(|| ObjError::InvalidConfigValueError {
                    field: ACCEL_TYPE.to_string(),
                    value: tag.to_string(),
                    reason: "Unknown accelerated client type".to_string(),
                }),
            None if self.accelerated() => Ok(ClientVariant::Accelerated),
            None => Ok(ClientVariant::Standard),
        }
    }

    /// The variant the accelerated slot of an engine should hold.
    pub fn accelerated_variant(&self) -> Result<ClientVariant> {
        match self.variant()? {
            ClientVariant::Standard => Ok(ClientVariant::Accelerated),
            variant => Ok(variant),
        }
    }
}

impl Validate for ClientParams {
    fn validate(&self) -> Result<()> {
        let bucket = self.bucket();
        let bucket = validation::validate_required_field(BUCKET, &bucket)?;
        validation::validate_s3_bucket_name(BUCKET, bucket)?;
        validation::validate_aws_region(REGION, self.region())?;

        match self.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ObjError::InvalidConfigValueError {
                    field: SCHEME.to_string(),
                    value: other.to_string(),
                    reason: "Scheme must be http or https".to_string(),
                })
            }
        }

        if let Some(endpoint) = self.endpoint_url() {
            validation::validate_url(ENDPOINT_OVERRIDE, &endpoint)?;
        }

        if self.contains(ACCESS_KEY) != self.contains(SECRET_KEY) {
            return Err(ObjError::ConfigError {
                message: "access_key and secret_key must be provided together".to_string(),
            });
        }

        for flag in [ACCELERATED, USE_VIRTUAL_ADDRESSING, USE_ACCELERATE_ENDPOINT] {
            if let Some(value) = self.get(flag) {
                validation::validate_flag(flag, value)?;
            }
        }

        if let Some(value) = self.get(PART_SIZE) {
            let part_size = validation::validate_number(PART_SIZE, value)?;
            validation::validate_range(PART_SIZE, part_size, MIN_PART_SIZE, MAX_PART_SIZE)?;
        }

        if let Some(value) = self.get(MAX_CONCURRENCY) {
            let concurrency = validation::validate_number(MAX_CONCURRENCY, value)?;
            validation::validate_range(MAX_CONCURRENCY, concurrency, 1, 256)?;
        }

        self.variant()?;

        tracing::debug!(bucket = bucket, region = self.region(), "client parameters validated");
        Ok(())
    }
}
