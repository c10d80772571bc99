//! Configuration types for apigate.
//!
//! This module provides the configuration used to reach the management API
//! and to drive a deployment run.
//!
//! # Overview
//!
//! - [`DeployConfig`]: The settings for one deployment run
//! - [`DeployConfigBuilder`]: A builder for constructing [`DeployConfig`] instances
//! - [`AccessKeyId`], [`SecretAccessKey`], [`Region`]: Validated credential parts
//! - [`EndpointUrl`]: A validated management API endpoint
//!
//! # Example
//!
//! ```rust
//! use apigate::{Credentials, DeployConfig};
//!
//! let credentials = Credentials::new("AKIDEXAMPLE", "secret", "us-east-1").unwrap();
//! let config = DeployConfig::builder()
//!     .credentials(credentials)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     config.endpoint().as_ref(),
//!     "https://apigateway.us-east-1.amazonaws.com"
//! );
//! ```

mod newtypes;

pub use newtypes::{AccessKeyId, EndpointUrl, Region, SecretAccessKey};

use crate::auth::Credentials;
use crate::error::ConfigError;

/// Model names API Gateway provisions alongside every new REST API.
pub const DEFAULT_MODEL_NAMES: &[&str] = &["Empty", "Error"];

/// Configuration for one deployment run.
///
/// `DeployConfig` is built once at startup and passed by reference to the
/// client and the orchestrator; nothing is cached globally.
#[derive(Clone, Debug)]
pub struct DeployConfig {
    credentials: Credentials,
    endpoint: EndpointUrl,
    user_agent_prefix: Option<String>,
    default_model_names: Vec<String>,
}

impl DeployConfig {
    /// Creates a new builder for constructing a `DeployConfig`.
    #[must_use]
    pub fn builder() -> DeployConfigBuilder {
        DeployConfigBuilder::new()
    }

    /// Returns the signing credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the management API endpoint.
    ///
    /// This is the configured override, or the regional AWS endpoint for the
    /// credentials' region.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointUrl {
        &self.endpoint
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the scaffold model names deleted after the API is created, in order.
    #[must_use]
    pub fn default_model_names(&self) -> &[String] {
        &self.default_model_names
    }
}

// Verify DeployConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DeployConfig>();
};

/// Builder for constructing [`DeployConfig`] instances.
///
/// `credentials` is required. Defaults:
///
/// - `endpoint`: `https://apigateway.{region}.amazonaws.com`
/// - `user_agent_prefix`: `None`
/// - `default_model_names`: [`DEFAULT_MODEL_NAMES`]
#[derive(Debug, Default)]
pub struct DeployConfigBuilder {
    credentials: Option<Credentials>,
    endpoint: Option<EndpointUrl>,
    user_agent_prefix: Option<String>,
    default_model_names: Option<Vec<String>>,
}

impl DeployConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signing credentials (required).
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Overrides the management API endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: EndpointUrl) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Replaces the list of scaffold models deleted after API creation.
    ///
    /// Pass an empty list to skip scaffold cleanup entirely.
    #[must_use]
    pub fn default_model_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_model_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the [`DeployConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `credentials` is not set.
    pub fn build(self) -> Result<DeployConfig, ConfigError> {
        let credentials = self.credentials.ok_or(ConfigError::MissingRequiredField {
            field: "credentials",
        })?;
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| EndpointUrl::for_region(credentials.region()));

        Ok(DeployConfig {
            credentials,
            endpoint,
            user_agent_prefix: self.user_agent_prefix,
            default_model_names: self.default_model_names.unwrap_or_else(|| {
                DEFAULT_MODEL_NAMES.iter().map(ToString::to_string).collect()
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> Credentials {
        Credentials::new("AKIDEXAMPLE", "secret", "eu-west-1").unwrap()
    }

    #[test]
    fn test_builder_requires_credentials() {
        let result = DeployConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "credentials"
            })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = DeployConfig::builder()
            .credentials(test_credentials())
            .build()
            .unwrap();

        assert_eq!(
            config.endpoint().as_ref(),
            "https://apigateway.eu-west-1.amazonaws.com"
        );
        assert!(config.user_agent_prefix().is_none());
        assert_eq!(config.default_model_names(), ["Empty", "Error"]);
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let endpoint = EndpointUrl::new("http://localhost:4566").unwrap();
        let config = DeployConfig::builder()
            .credentials(test_credentials())
            .endpoint(endpoint.clone())
            .user_agent_prefix("ci-pipeline/2.1")
            .default_model_names(["Empty"])
            .build()
            .unwrap();

        assert_eq!(config.endpoint(), &endpoint);
        assert_eq!(config.user_agent_prefix(), Some("ci-pipeline/2.1"));
        assert_eq!(config.default_model_names(), ["Empty"]);
    }

    #[test]
    fn test_empty_default_model_list_is_kept() {
        let config = DeployConfig::builder()
            .credentials(test_credentials())
            .default_model_names(Vec::<String>::new())
            .build()
            .unwrap();

        assert!(config.default_model_names().is_empty());
    }

    #[test]
    fn test_config_debug_masks_secret() {
        let config = DeployConfig::builder()
            .credentials(Credentials::new("AKIDEXAMPLE", "do-not-print", "us-east-1").unwrap())
            .build()
            .unwrap();

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("DeployConfig"));
        assert!(!debug_str.contains("do-not-print"));
    }
}
