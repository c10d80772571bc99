//! HTTP-specific error types.
//!
//! This module contains error types for HTTP operations, including response
//! errors and request validation failures.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the management API
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! No variant is retried by the client. Every failure is returned to the
//! caller as soon as it is observed.
//!
//! # Example
//!
//! ```rust,ignore
//! use apigate::clients::{HttpClient, HttpRequest, HttpMethod, HttpError};
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Authentication(e)) => println!("Signature rejected: {}", e),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
//!     Err(other) => println!("Request failed: {}", other),
//! }
//! ```

use thiserror::Error;

use crate::auth::SigningError;

/// Error returned when a request receives a non-successful response.
///
/// # Example
///
/// ```rust
/// use apigate::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 409,
///     message: "Another resource with the same parent already has this name: users".to_string(),
///     error_type: Some("ConflictException".to_string()),
///     request_id: Some("abc-123".to_string()),
/// };
///
/// assert!(error.to_string().contains("409"));
/// assert!(error.to_string().contains("ConflictException"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code} {}: {message}", .error_type.as_deref().unwrap_or("Error"))]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The message reported by the remote service, or the raw body.
    pub message: String,
    /// The remote error type (from `x-amzn-ErrorType` or the body), if any.
    pub error_type: Option<String>,
    /// Request id for support requests (from `x-amzn-RequestId`).
    pub request_id: Option<String>,
}

/// Error returned when an HTTP request fails validation.
///
/// Raised before a request is signed or sent.
///
/// # Example
///
/// ```rust
/// use apigate::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "POST".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use POST without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The remote service rejected the request signature or credentials (401/403).
    #[error("Authentication failed: {0}")]
    Authentication(HttpResponseError),

    /// Any other non-2xx response.
    #[error(transparent)]
    Response(HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The request could not be signed.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A successful response did not have the expected shape.
    #[error("Unexpected response body for {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// The decoding failure.
        source: serde_json::Error,
    },
}

impl HttpError {
    /// Classifies a non-2xx response.
    ///
    /// 401 and 403 become [`HttpError::Authentication`]; everything else is
    /// [`HttpError::Response`].
    #[must_use]
    pub fn from_response(error: HttpResponseError) -> Self {
        match error.code {
            401 | 403 => Self::Authentication(error),
            _ => Self::Response(error),
        }
    }

    /// Returns the remote response details for `Authentication` and `Response`.
    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponseError> {
        match self {
            Self::Authentication(e) | Self::Response(e) => Some(e),
            _ => None,
        }
    }
}
