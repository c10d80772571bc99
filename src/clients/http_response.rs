//! HTTP response types.
//!
//! This module provides the [`HttpResponse`] type for accessing the status,
//! headers, and JSON body returned by the management API.

use std::collections::HashMap;

use crate::clients::errors::HttpResponseError;

/// An HTTP response from the management API.
///
/// Header names are stored lowercased; a header may carry several values.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body (`{}` when empty).
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of header `name` (case-insensitive), if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `x-amzn-RequestId` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-amzn-requestid")
    }

    /// Returns the remote error type, if present.
    ///
    /// Taken from the `x-amzn-ErrorType` header (anything after `:` is
    /// dropped), falling back to a `__type` or `type` field in the body.
    #[must_use]
    pub fn error_type(&self) -> Option<String> {
        self.header("x-amzn-errortype")
            .map(|value| value.split(':').next().unwrap_or(value).to_string())
            .or_else(|| {
                ["__type", "type"]
                    .iter()
                    .find_map(|key| self.body.get(key).and_then(|v| v.as_str()))
                    .map(|value| value.rsplit('#').next().unwrap_or(value).to_string())
            })
    }

    /// Returns the error message reported by the remote service.
    ///
    /// Uses the body's `message` or `Message` field, then `raw_body` for
    /// bodies that were not JSON, and finally the serialized body.
    #[must_use]
    pub fn error_message(&self) -> String {
        ["message", "Message", "raw_body"]
            .iter()
            .find_map(|key| self.body.get(key).and_then(|v| v.as_str()))
            .map_or_else(|| self.body.to_string(), ToString::to_string)
    }

    /// Converts a non-2xx response into its error details.
    #[must_use]
    pub fn to_error(&self) -> HttpResponseError {
        HttpResponseError {
            code: self.code,
            message: self.error_message(),
            error_type: self.error_type(),
            request_id: self.request_id().map(String::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in pairs {
            map.entry((*k).to_string())
                .or_default()
                .push((*v).to_string());
        }
        map
    }

    #[test]
    fn test_is_ok_for_2xx_range() {
        assert!(HttpResponse::new(200, HashMap::new(), json!({})).is_ok());
        assert!(HttpResponse::new(201, HashMap::new(), json!({})).is_ok());
        assert!(HttpResponse::new(202, HashMap::new(), json!({})).is_ok());
        assert!(!HttpResponse::new(404, HashMap::new(), json!({})).is_ok());
        assert!(!HttpResponse::new(500, HashMap::new(), json!({})).is_ok());
    }

    #[test]
    fn test_request_id_and_error_type_from_headers() {
        let response = HttpResponse::new(
            409,
            headers(&[
                ("x-amzn-requestid", "req-42"),
                (
                    "x-amzn-errortype",
                    "ConflictException:http://internal.amazon.com/coral/",
                ),
            ]),
            json!({"message": "Another resource with the same parent already has this name: items"}),
        );

        assert_eq!(response.request_id(), Some("req-42"));
        assert_eq!(response.error_type().as_deref(), Some("ConflictException"));
        assert_eq!(
            response.error_message(),
            "Another resource with the same parent already has this name: items"
        );
    }

    #[test]
    fn test_error_type_from_body() {
        let response = HttpResponse::new(
            404,
            HashMap::new(),
            json!({"__type": "com.amazonaws#NotFoundException", "Message": "Invalid Model Name specified: Error"}),
        );

        assert_eq!(response.error_type().as_deref(), Some("NotFoundException"));
        assert_eq!(response.error_message(), "Invalid Model Name specified: Error");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        let response = HttpResponse::new(502, HashMap::new(), json!({"raw_body": "Bad Gateway"}));
        assert_eq!(response.error_message(), "Bad Gateway");

        let response = HttpResponse::new(400, HashMap::new(), json!({"detail": 1}));
        assert_eq!(response.error_message(), r#"{"detail":1}"#);
    }

    #[test]
    fn test_to_error_carries_all_details() {
        let response = HttpResponse::new(
            400,
            headers(&[("x-amzn-requestid", "r-1"), ("x-amzn-errortype", "BadRequestException")]),
            json!({"message": "Invalid path part"}),
        );

        let error = response.to_error();
        assert_eq!(error.code, 400);
        assert_eq!(error.message, "Invalid path part");
        assert_eq!(error.error_type.as_deref(), Some("BadRequestException"));
        assert_eq!(error.request_id.as_deref(), Some("r-1"));
    }
}
