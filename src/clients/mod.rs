//! HTTP client types for management API communication.
//!
//! This module provides the transport layer for making signed requests to
//! the management API. It handles request validation, SigV4 signing,
//! response parsing, and error classification.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP client; signs every call
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods
//! - [`DataType`]: Content types for request bodies
//! - [`HttpError`]: Transport and remote failures
//!
//! # Retry Behavior
//!
//! The client never retries. A 5xx, throttling response, or network failure
//! is returned to the caller on the first attempt.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
