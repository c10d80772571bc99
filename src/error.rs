//! Configuration error types for apigate.
//!
//! This module contains the error type returned when credentials, endpoints,
//! or the deployment configuration fail validation.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use apigate::{AccessKeyId, ConfigError};
//!
//! let result = AccessKeyId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAccessKeyId)));
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building credentials or configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Access key id cannot be empty.
    #[error("Access key id cannot be empty. Please provide a valid AWS access key id.")]
    EmptyAccessKeyId,

    /// Secret access key cannot be empty.
    #[error("Secret access key cannot be empty. Please provide a valid AWS secret access key.")]
    EmptySecretAccessKey,

    /// Region is invalid.
    #[error("Invalid region '{region}'. Expected a region name such as 'us-east-1'.")]
    InvalidRegion {
        /// The invalid region that was provided.
        region: String,
    },

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint URL '{url}'. Please provide an http or https URL with a host (e.g., 'https://apigateway.us-east-1.amazonaws.com').")]
    InvalidEndpointUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// No credentials could be found in the environment or the credentials file.
    #[error("No credentials found for profile '{profile}'. Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY or add the profile to {path:?}.")]
    CredentialsNotFound {
        /// The profile that was looked up.
        profile: String,
        /// The credentials file that was searched.
        path: PathBuf,
    },

    /// The credentials file could not be read.
    #[error("Failed to read credentials file {path:?}: {reason}")]
    CredentialsFileUnreadable {
        /// The credentials file path.
        path: PathBuf,
        /// The underlying I/O failure.
        reason: String,
    },
}
