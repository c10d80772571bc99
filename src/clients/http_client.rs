//! Signed HTTP client for the management API.
//!
//! This module provides the [`HttpClient`] type, which signs every request
//! with AWS Signature Version 4 before sending it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::auth::signing::AMZ_DATE_FORMAT;
use crate::auth::{Credentials, SignedRequest, SigningContext};
use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{DeployConfig, EndpointUrl};

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making signed requests to the management API.
///
/// The client handles:
/// - URL construction from the configured endpoint
/// - Default headers including `Accept`, `Host`, and `X-Amz-Date`
/// - SigV4 signing of every request with a fresh timestamp
/// - Classification of non-2xx responses
///
/// Requests are never retried. The underlying connection pool is reused for
/// every call made through one client.
///
/// # Example
///
/// ```rust,ignore
/// use apigate::{Credentials, DeployConfig};
/// use apigate::clients::{HttpClient, HttpRequest, HttpMethod};
///
/// let config = DeployConfig::builder()
///     .credentials(Credentials::new("AKID", "secret", "us-east-1")?)
///     .build()?;
/// let client = HttpClient::new(&config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/restapis").build()?;
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    endpoint: EndpointUrl,
    credentials: Credentials,
    default_headers: HashMap<String, String>,
    user_agent: String,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the deployment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g., TLS initialization failure).
    pub fn new(config: &DeployConfig) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!("{user_agent_prefix}apigate v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert(
            "Host".to_string(),
            config.endpoint().host_header().to_string(),
        );

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint().clone(),
            credentials: config.credentials().clone(),
            default_headers,
            user_agent,
        })
    }

    /// Returns the endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointUrl {
        &self.endpoint
    }

    /// Returns the headers signed into every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the (unsigned) `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the full URL for a request, with query parameters sorted by name.
    #[must_use]
    pub fn url_for(&self, request: &HttpRequest) -> String {
        let mut url = format!("{}{}", self.endpoint.as_ref(), request.path);

        if let Some(query) = request.query.as_ref().filter(|q| !q.is_empty()) {
            let mut pairs: Vec<(&String, &String)> = query.iter().collect();
            pairs.sort();
            let encoded: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&encoded.join("&"));
        }

        url
    }

    /// Signs and sends a request, timestamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - The URL cannot be signed (`Signing`)
    /// - A network error occurs (`Network`)
    /// - The remote rejects the signature (`Authentication`)
    /// - Any other non-2xx response is received (`Response`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.request_at(request, Utc::now()).await
    }

    /// Builds the signed form of `request` using `timestamp`.
    ///
    /// Every header in the result except `Authorization` is covered by the
    /// signature. `User-Agent` is added at send time and is not signed.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if validation fails, or
    /// [`HttpError::Signing`] if the URL cannot be signed.
    pub fn sign_request(
        &self,
        request: &HttpRequest,
        timestamp: DateTime<Utc>,
    ) -> Result<SignedRequest, HttpError> {
        request.verify()?;

        let mut headers = self.default_headers.clone();
        headers.insert(
            "X-Amz-Date".to_string(),
            timestamp.format(AMZ_DATE_FORMAT).to_string(),
        );
        if let Some(body_type) = &request.body_type {
            headers.insert(
                "Content-Type".to_string(),
                body_type.as_content_type().to_string(),
            );
        }

        let signed = SigningContext::new(&self.credentials).sign_request(
            request.http_method.as_str(),
            self.url_for(request),
            headers,
            request.body_bytes(),
            timestamp,
        )?;
        Ok(signed)
    }

    /// Signs and sends a request using `timestamp` for the signature.
    ///
    /// `timestamp` must be close to the wall clock when the request is sent;
    /// the remote service rejects stale signatures.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn request_at(
        &self,
        request: HttpRequest,
        timestamp: DateTime<Utc>,
    ) -> Result<HttpResponse, HttpError> {
        let signed = self.sign_request(&request, timestamp)?;

        tracing::debug!(
            method = %request.http_method,
            path = %request.path,
            "Sending management API request"
        );

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&signed.url),
            HttpMethod::Post => self.client.post(&signed.url),
            HttpMethod::Put => self.client.put(&signed.url),
            HttpMethod::Delete => self.client.delete(&signed.url),
        };
        for (key, value) in &signed.headers {
            req_builder = req_builder.header(key, value);
        }
        req_builder = req_builder.header("User-Agent", &self.user_agent);
        if !signed.body.is_empty() {
            req_builder = req_builder.body(signed.body);
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.unwrap_or_default();

        let body = if body_text.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text)
                .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
        };

        let response = HttpResponse::new(code, res_headers, body);

        if response.is_ok() {
            return Ok(response);
        }

        tracing::debug!(
            method = %request.http_method,
            path = %request.path,
            code,
            request_id = response.request_id().unwrap_or("-"),
            "Management API request rejected"
        );
        Err(HttpError::from_response(response.to_error()))
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::sign;
    use crate::clients::DataType;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_credentials() -> Credentials {
        Credentials::new("AKIDEXAMPLE", "test-secret", "us-east-1").unwrap()
    }

    fn config_for(endpoint: &str) -> DeployConfig {
        DeployConfig::builder()
            .credentials(test_credentials())
            .endpoint(EndpointUrl::new(endpoint).unwrap())
            .build()
            .unwrap()
    }

    fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn test_client_uses_regional_endpoint_by_default() {
        let config = DeployConfig::builder()
            .credentials(test_credentials())
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        assert_eq!(
            client.endpoint().as_ref(),
            "https://apigateway.us-east-1.amazonaws.com"
        );
        assert_eq!(
            client.default_headers().get("Host"),
            Some(&"apigateway.us-east-1.amazonaws.com".to_string())
        );
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = DeployConfig::builder()
            .credentials(test_credentials())
            .user_agent_prefix("release-bot/3")
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        assert!(client.user_agent().starts_with("release-bot/3 | "));
        assert!(client.user_agent().contains("apigate v"));
    }

    #[test]
    fn test_url_for_sorts_and_encodes_query() {
        let client = HttpClient::new(&config_for("http://localhost:9000")).unwrap();
        let request = HttpRequest::builder(HttpMethod::Get, "/restapis/a1/resources")
            .query_param("position", "x/y")
            .query_param("limit", "500")
            .build()
            .unwrap();

        assert_eq!(
            client.url_for(&request),
            "http://localhost:9000/restapis/a1/resources?limit=500&position=x%2Fy"
        );
    }

    #[test]
    fn test_sign_request_signs_every_sent_header() {
        let client = HttpClient::new(&config_for("http://localhost:4566")).unwrap();
        let body = json!({"name": "Demo"});
        let request = HttpRequest::builder(HttpMethod::Post, "/restapis")
            .body(body.clone())
            .body_type(DataType::Json)
            .build()
            .unwrap();

        let signed = client.sign_request(&request, fixed_timestamp()).unwrap();

        let mut expected_headers = HashMap::new();
        expected_headers.insert("Accept".to_string(), "application/json".to_string());
        expected_headers.insert("Host".to_string(), "localhost:4566".to_string());
        expected_headers.insert("X-Amz-Date".to_string(), "20240506T070809Z".to_string());
        expected_headers.insert("Content-Type".to_string(), "application/json".to_string());
        let expected = sign(
            &test_credentials(),
            "POST",
            "http://localhost:4566/restapis",
            &expected_headers,
            body.to_string().as_bytes(),
            fixed_timestamp(),
        )
        .unwrap();

        assert_eq!(signed.method, "POST");
        assert_eq!(signed.url, "http://localhost:4566/restapis");
        assert_eq!(signed.headers.get("Authorization"), Some(&expected));
        assert!(expected.contains("SignedHeaders=accept;content-type;host;x-amz-date,"));
        assert_eq!(signed.headers.len(), expected_headers.len() + 1);
        assert_eq!(signed.body, body.to_string().into_bytes());
    }

    #[test]
    fn test_sign_request_without_body_hashes_empty_payload() {
        let client = HttpClient::new(&config_for("http://localhost:4566")).unwrap();
        let request = HttpRequest::builder(HttpMethod::Delete, "/restapis/a1/models/Empty")
            .build()
            .unwrap();

        let signed = client.sign_request(&request, fixed_timestamp()).unwrap();

        assert!(signed.body.is_empty());
        assert!(!signed.headers.contains_key("Content-Type"));
        assert!(signed.headers["Authorization"].contains("SignedHeaders=accept;host;x-amz-date,"));
    }

    #[tokio::test]
    async fn test_request_sends_signed_headers() {
        let mock_server = MockServer::start().await;
        let client = HttpClient::new(&config_for(&mock_server.uri())).unwrap();
        let body = json!({"name": "Demo"});

        Mock::given(method("POST"))
            .and(path("/restapis"))
            .and(header_exists("authorization"))
            .and(header("x-amz-date", "20240506T070809Z"))
            .and(header("content-type", "application/json"))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "a1", "name": "Demo"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = HttpRequest::builder(HttpMethod::Post, "/restapis")
            .body(body)
            .body_type(DataType::Json)
            .build()
            .unwrap();
        let response = client.request_at(request, fixed_timestamp()).await.unwrap();

        assert_eq!(response.code, 201);
        assert_eq!(response.body["id"], "a1");
    }

    #[tokio::test]
    async fn test_query_parameters_are_sent() {
        let mock_server = MockServer::start().await;
        let client = HttpClient::new(&config_for(&mock_server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/restapis/a1/resources"))
            .and(query_param("limit", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = HttpRequest::builder(HttpMethod::Get, "/restapis/a1/resources")
            .query_param("limit", "500")
            .build()
            .unwrap();
        let response = client.request(request).await.unwrap();
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn test_forbidden_response_is_authentication_error() {
        let mock_server = MockServer::start().await;
        let client = HttpClient::new(&config_for(&mock_server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/restapis"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-amzn-ErrorType", "InvalidSignatureException")
                    .set_body_json(json!({"message": "Signature expired"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = HttpRequest::builder(HttpMethod::Get, "/restapis")
            .build()
            .unwrap();
        let result = client.request(request).await;

        match result {
            Err(HttpError::Authentication(e)) => {
                assert_eq!(e.code, 403);
                assert_eq!(e.message, "Signature expired");
                assert_eq!(e.error_type.as_deref(), Some("InvalidSignatureException"));
            }
            other => panic!("Expected Authentication error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mock_server = MockServer::start().await;
        let client = HttpClient::new(&config_for(&mock_server.uri())).unwrap();

        Mock::given(method("DELETE"))
            .and(path("/restapis/a1/models/Empty"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = HttpRequest::builder(HttpMethod::Delete, "/restapis/a1/models/Empty")
            .build()
            .unwrap();
        let result = client.request(request).await;

        match result {
            Err(HttpError::Response(e)) => {
                assert_eq!(e.code, 500);
                assert_eq!(e.message, "upstream failure");
            }
            other => panic!("Expected Response error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_sending() {
        let client = HttpClient::new(&config_for("http://127.0.0.1:9")).unwrap();
        let request = HttpRequest {
            http_method: HttpMethod::Post,
            path: "/restapis".to_string(),
            body: None,
            body_type: None,
            query: None,
        };

        let result = client.request(request).await;
        assert!(matches!(result, Err(HttpError::InvalidRequest(_))));
    }
}
