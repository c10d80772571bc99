//! AWS Signature Version 4 request signing.
//!
//! Every management API call carries an `Authorization` header computed from
//! the credentials, a canonical form of the request, and the request
//! timestamp. For fixed inputs the header is bit-identical, so the signer can
//! be tested without a clock.
//!
//! # Algorithm
//!
//! 1. Build the canonical request: method, canonical URI, canonical query,
//!    canonical headers, signed header names, and the SHA-256 of the body.
//! 2. Derive the signing key by chaining HMAC-SHA256 over the date, region,
//!    service, and the `aws4_request` terminator, seeded with `AWS4` + secret.
//! 3. Sign the string to sign (algorithm, timestamp, credential scope, hash of
//!    the canonical request) with the derived key.
//!
//! # Example
//!
//! ```rust
//! use apigate::auth::signing::{hash_payload, EMPTY_PAYLOAD_HASH};
//!
//! assert_eq!(hash_payload(b""), EMPTY_PAYLOAD_HASH);
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::auth::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm identifier placed in the string to sign and the header.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name folded into the credential scope.
pub const SERVICE_NAME: &str = "apigateway";

/// Fixed last element of every credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";

/// `strftime` format of the `X-Amz-Date` header value.
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

const SCOPE_DATE_FORMAT: &str = "%Y%m%d";

/// Hex SHA-256 of the empty byte sequence.
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Errors raised while signing a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// The request URL could not be parsed.
    #[error("Cannot sign request for invalid URL '{url}'.")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
    },
}

/// A request that has been signed and is ready to send.
///
/// Built fresh for every call; the signature binds to the timestamp so a
/// `SignedRequest` must never be replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
    /// Uppercase HTTP method.
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Every header to send, including `Authorization`.
    pub headers: HashMap<String, String>,
    /// Request body bytes.
    pub body: Vec<u8>,
}

/// Signs requests on behalf of one set of credentials.
///
/// # Example
///
/// ```rust
/// use apigate::auth::{Credentials, SigningContext};
/// use chrono::{TimeZone, Utc};
/// use std::collections::HashMap;
///
/// let credentials = Credentials::new("AKIDEXAMPLE", "secret", "us-east-1").unwrap();
/// let context = SigningContext::new(&credentials);
/// let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
///
/// let first = context.sign("GET", "https://example.com/restapis", &HashMap::new(), b"", timestamp).unwrap();
/// let second = context.sign("GET", "https://example.com/restapis", &HashMap::new(), b"", timestamp).unwrap();
/// assert_eq!(first, second);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SigningContext<'a> {
    credentials: &'a Credentials,
    service: &'a str,
}

impl<'a> SigningContext<'a> {
    /// Creates a signing context for the API Gateway service.
    #[must_use]
    pub const fn new(credentials: &'a Credentials) -> Self {
        Self {
            credentials,
            service: SERVICE_NAME,
        }
    }

    /// Creates a signing context for another AWS service name.
    #[must_use]
    pub const fn with_service(credentials: &'a Credentials, service: &'a str) -> Self {
        Self {
            credentials,
            service,
        }
    }

    /// Returns the credential scope (`date/region/service/aws4_request`) for `timestamp`.
    #[must_use]
    pub fn credential_scope(&self, timestamp: DateTime<Utc>) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            timestamp.format(SCOPE_DATE_FORMAT),
            self.credentials.region(),
            self.service
        )
    }

    /// Computes the `Authorization` header value for a request.
    ///
    /// Every entry of `headers` is signed. Header names are compared
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidUrl`] if `url` cannot be parsed.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        let canonical = canonical_request(method, url, headers, body)?;
        let scope = self.credential_scope(timestamp);
        let to_sign = string_to_sign(timestamp, &scope, &canonical);

        let key = derive_signing_key(
            self.credentials.secret_access_key().as_ref(),
            timestamp,
            self.credentials.region().as_ref(),
            self.service,
        );
        let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes()));

        Ok(format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
            self.credentials.access_key_id().as_ref(),
            signed_header_names(headers),
        ))
    }

    /// Signs a request and returns it with the `Authorization` header attached.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidUrl`] if `url` cannot be parsed.
    pub fn sign_request(
        &self,
        method: &str,
        url: impl Into<String>,
        mut headers: HashMap<String, String>,
        body: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Result<SignedRequest, SigningError> {
        let url = url.into();
        let authorization = self.sign(method, &url, &headers, &body, timestamp)?;
        headers.insert("Authorization".to_string(), authorization);

        Ok(SignedRequest {
            method: method.to_uppercase(),
            url,
            headers,
            body,
        })
    }
}

/// Computes the `Authorization` header value for the API Gateway service.
///
/// Shorthand for [`SigningContext::new`] followed by [`SigningContext::sign`].
///
/// # Errors
///
/// Returns [`SigningError::InvalidUrl`] if `url` cannot be parsed.
pub fn sign(
    credentials: &Credentials,
    method: &str,
    url: &str,
    headers: &HashMap<String, String>,
    body: &[u8],
    timestamp: DateTime<Utc>,
) -> Result<String, SigningError> {
    SigningContext::new(credentials).sign(method, url, headers, body, timestamp)
}

/// Builds the canonical request string.
///
/// # Errors
///
/// Returns [`SigningError::InvalidUrl`] if `url` cannot be parsed.
pub fn canonical_request(
    method: &str,
    url: &str,
    headers: &HashMap<String, String>,
    body: &[u8],
) -> Result<String, SigningError> {
    let parsed = Url::parse(url).map_err(|_| SigningError::InvalidUrl {
        url: url.to_string(),
    })?;

    let canonical_headers: String = canonical_headers(headers)
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();

    Ok(format!(
        "{}\n{}\n{}\n{canonical_headers}\n{}\n{}",
        method.to_uppercase(),
        canonical_uri(parsed.path()),
        canonical_query(&parsed),
        signed_header_names(headers),
        hash_payload(body),
    ))
}

/// Builds the string to sign from the canonical request.
#[must_use]
pub fn string_to_sign(timestamp: DateTime<Utc>, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        timestamp.format(AMZ_DATE_FORMAT),
        hash_payload(canonical_request.as_bytes())
    )
}

/// Derives the scoped signing key.
#[must_use]
pub fn derive_signing_key(
    secret: &str,
    timestamp: DateTime<Utc>,
    region: &str,
    service: &str,
) -> Vec<u8> {
    let date = timestamp.format(SCOPE_DATE_FORMAT).to_string();
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

/// Returns the lowercase hex SHA-256 of `payload`.
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Returns the sorted, semicolon-joined lowercase header names.
#[must_use]
pub fn signed_header_names(headers: &HashMap<String, String>) -> String {
    canonical_headers(headers)
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(";")
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

// Names lowercased, values trimmed with inner whitespace runs collapsed.
// Headers that collide after lowercasing are joined with ',' in sorted order.
fn canonical_headers(headers: &HashMap<String, String>) -> BTreeMap<String, String> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        grouped
            .entry(name.trim().to_lowercase())
            .or_default()
            .push(value);
    }

    grouped
        .into_iter()
        .map(|(name, mut values)| {
            values.sort();
            (name, values.join(","))
        })
        .collect()
}

fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            (
                urlencoding::encode(&key).into_owned(),
                urlencoding::encode(&value).into_owned(),
            )
        })
        .collect();
    pairs.sort();

    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}
