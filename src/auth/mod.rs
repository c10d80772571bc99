//! Authentication for management API calls.
//!
//! This module provides the credentials used to authenticate with the
//! management API and the AWS Signature Version 4 signer that turns them into
//! an `Authorization` header.
//!
//! # Overview
//!
//! - [`Credentials`]: Access key id, secret access key, and region
//! - [`signing`]: Canonical requests, key derivation, and [`SigningContext`]
//! - [`profile`]: Loading credentials from the environment or a shared
//!   credentials file
//!
//! # Example
//!
//! ```rust
//! use apigate::auth::{Credentials, SigningContext};
//! use chrono::{TimeZone, Utc};
//! use std::collections::HashMap;
//!
//! let credentials = Credentials::new("AKIDEXAMPLE", "secret", "us-east-1").unwrap();
//! let mut headers = HashMap::new();
//! headers.insert("Host".to_string(), "apigateway.us-east-1.amazonaws.com".to_string());
//! headers.insert("X-Amz-Date".to_string(), "20240102T030405Z".to_string());
//!
//! let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
//! let authorization = SigningContext::new(&credentials)
//!     .sign("GET", "https://apigateway.us-east-1.amazonaws.com/restapis", &headers, b"", timestamp)
//!     .unwrap();
//!
//! assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240102/us-east-1/apigateway/aws4_request"));
//! ```

pub mod profile;
pub mod signing;

pub use signing::{sign, SignedRequest, SigningContext, SigningError};

use crate::config::{AccessKeyId, Region, SecretAccessKey};
use crate::error::ConfigError;

/// Credentials used to sign every management API call.
///
/// Credentials are loaded once per run and passed by reference wherever a
/// request is signed. The secret is masked in `Debug` output.
///
/// # Example
///
/// ```rust
/// use apigate::Credentials;
///
/// let credentials = Credentials::new("AKIDEXAMPLE", "s3cr3t-value", "eu-west-1").unwrap();
/// assert_eq!(credentials.region().as_ref(), "eu-west-1");
/// assert!(!format!("{credentials:?}").contains("s3cr3t-value"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: AccessKeyId,
    secret_access_key: SecretAccessKey,
    region: Region,
}

impl Credentials {
    /// Creates credentials from raw strings, validating each part.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the access key id or secret is empty, or the
    /// region is malformed.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::from_parts(
            AccessKeyId::new(access_key_id)?,
            SecretAccessKey::new(secret_access_key)?,
            Region::new(region)?,
        ))
    }

    /// Creates credentials from already validated parts.
    #[must_use]
    pub const fn from_parts(
        access_key_id: AccessKeyId,
        secret_access_key: SecretAccessKey,
        region: Region,
    ) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            region,
        }
    }

    /// Returns the access key id.
    #[must_use]
    pub const fn access_key_id(&self) -> &AccessKeyId {
        &self.access_key_id
    }

    /// Returns the secret access key.
    #[must_use]
    pub const fn secret_access_key(&self) -> &SecretAccessKey {
        &self.secret_access_key
    }

    /// Returns the region requests are signed for.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }
}
