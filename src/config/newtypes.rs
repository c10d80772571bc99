//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use reqwest::Url;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated AWS access key id.
///
/// # Example
///
/// ```rust
/// use apigate::AccessKeyId;
///
/// let key = AccessKeyId::new("AKIDEXAMPLE").unwrap();
/// assert_eq!(key.as_ref(), "AKIDEXAMPLE");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessKeyId(String);

impl AccessKeyId {
    /// Creates a new validated access key id.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessKeyId`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::EmptyAccessKeyId);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for AccessKeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated AWS secret access key.
///
/// The `Debug` implementation masks the secret value, displaying only
/// `SecretAccessKey(*****)` instead of the actual key.
///
/// # Example
///
/// ```rust
/// use apigate::SecretAccessKey;
///
/// let secret = SecretAccessKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "SecretAccessKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretAccessKey(String);

impl SecretAccessKey {
    /// Creates a new validated secret access key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecretAccessKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::EmptySecretAccessKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for SecretAccessKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretAccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretAccessKey(*****)")
    }
}

/// A validated AWS region name such as `us-east-1`.
///
/// Region names are normalized to lowercase and may only contain ASCII
/// letters, digits, and hyphens.
///
/// # Example
///
/// ```rust
/// use apigate::Region;
///
/// let region = Region::new("EU-West-1").unwrap();
/// assert_eq!(region.as_ref(), "eu-west-1");
/// assert_eq!(Region::default().as_ref(), "us-east-1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    /// The region used when none is configured.
    pub const DEFAULT: &'static str = "us-east-1";

    /// Creates a new validated region.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegion`] if the region is empty, starts or
    /// ends with a hyphen, or contains characters other than letters, digits,
    /// and hyphens.
    pub fn new(region: impl Into<String>) -> Result<Self, ConfigError> {
        let region = region.into().trim().to_lowercase();

        let valid = !region.is_empty()
            && !region.starts_with('-')
            && !region.ends_with('-')
            && region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if !valid {
            return Err(ConfigError::InvalidRegion { region });
        }
        Ok(Self(region))
    }
}

impl Default for Region {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Region {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated endpoint for the management API.
///
/// Used to point the client at something other than the regional AWS
/// endpoint, such as a VPC endpoint or a local mock server.
///
/// # Example
///
/// ```rust
/// use apigate::EndpointUrl;
///
/// let url = EndpointUrl::new("http://localhost:4566/").unwrap();
/// assert_eq!(url.scheme(), "http");
/// assert_eq!(url.host_header(), "localhost:4566");
/// assert_eq!(url.as_ref(), "http://localhost:4566");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointUrl {
    base: String,
    host_header: String,
    scheme: String,
}

impl EndpointUrl {
    /// Creates a new validated endpoint URL.
    ///
    /// A trailing slash is removed so request paths can be appended directly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpointUrl`] if the URL cannot be parsed,
    /// does not use `http` or `https`, or has no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_string();
        let invalid = || ConfigError::InvalidEndpointUrl { url: url.clone() };

        let parsed = Url::parse(&url).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid());
        }
        let host = parsed.host_str().ok_or_else(invalid)?;
        let host_header = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            base: url.trim_end_matches('/').to_string(),
            host_header,
            scheme: parsed.scheme().to_string(),
        })
    }

    /// Returns the regional API Gateway endpoint for `region`.
    #[must_use]
    pub fn for_region(region: &Region) -> Self {
        let host_header = format!("apigateway.{region}.amazonaws.com");
        Self {
            base: format!("https://{host_header}"),
            host_header,
            scheme: "https".to_string(),
        }
    }

    /// Returns the URL scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the value sent (and signed) as the `Host` header.
    ///
    /// Includes the port when the URL names a non-default one.
    #[must_use]
    pub fn host_header(&self) -> &str {
        &self.host_header
    }
}

impl AsRef<str> for EndpointUrl {
    fn as_ref(&self) -> &str {
        &self.base
    }
}
