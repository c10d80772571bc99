//! Declarative API specification loading.
//!
//! Reads a Swagger-style document (YAML or JSON) into an [`ApiSpecification`]:
//! the API title, an optional base path, the declared paths, and the
//! operations attached to them, all in document order.
//!
//! # Document shape
//!
//! ```yaml
//! swagger: "2.0"
//! info:
//!   title: Demo
//! basePath: /v1
//! paths:
//!   /items:
//!     get:
//!       x-api-key-required: true
//!   /items/{id}:
//!     get:
//!       x-request-parameters:
//!         method.request.path.id: true
//! ```
//!
//! Recognised operation keys are `get`, `put`, `post`, `delete`, `options`,
//! `head` and `patch`. Other path-level keys (`parameters`, `x-*`) are
//! ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::gateway::PutMethodBody;

/// Operation keys recognised under a path entry.
pub const OPERATION_KEYS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

/// Errors raised while loading a specification document.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The document could not be read.
    #[error("Failed to read specification '{}': {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid YAML/JSON.
    #[error("Failed to parse specification: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but does not describe a usable API.
    #[error("Invalid specification: {reason}")]
    InvalidDocument {
        /// What is wrong with the document.
        reason: String,
    },
}

impl SpecError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }
}

/// One full resource path, as its ordered non-empty segments.
///
/// The root path `/` has no segments.
///
/// # Example
///
/// ```rust
/// use apigate::spec::PathSpec;
///
/// let path = PathSpec::parse("/items/{id}").unwrap();
/// assert_eq!(path.segments(), &["items", "{id}"]);
/// assert_eq!(path.to_string(), "/items/{id}");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSpec {
    segments: Vec<String>,
}

impl PathSpec {
    /// Parses an absolute path. Empty segments (`//`, trailing `/`) are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidDocument`] if `path` does not start with `/`.
    pub fn parse(path: &str) -> Result<Self, SpecError> {
        if !path.starts_with('/') {
            return Err(SpecError::invalid(format!(
                "path '{path}' must start with '/'"
            )));
        }
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(String::from)
            .collect();
        Ok(Self { segments })
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// An operation declared on a path.
///
/// Optional fields stay `None` when the document does not mention them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationSpec {
    /// Uppercase HTTP method, e.g. `GET`.
    pub http_method: String,
    /// Owning path in canonical form (see [`PathSpec`]), without base path.
    pub path: String,
    /// `x-api-key-required`.
    pub api_key_required: Option<bool>,
    /// `x-authorization-type`.
    pub authorization_type: Option<String>,
    /// `x-request-models`: content type to model name.
    pub request_models: Option<BTreeMap<String, String>>,
    /// `x-request-parameters`: parameter name to required flag.
    pub request_parameters: Option<BTreeMap<String, bool>>,
}

impl OperationSpec {
    /// Builds the method attachment body. Absent fields remain absent.
    #[must_use]
    pub fn to_put_method_body(&self) -> PutMethodBody {
        PutMethodBody {
            api_key_required: self.api_key_required,
            authorization_type: self.authorization_type.clone(),
            request_models: self.request_models.clone(),
            request_parameters: self.request_parameters.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OperationExtensions {
    #[serde(rename = "x-api-key-required")]
    api_key_required: Option<bool>,
    #[serde(rename = "x-authorization-type")]
    authorization_type: Option<String>,
    #[serde(rename = "x-request-models")]
    request_models: Option<BTreeMap<String, String>>,
    #[serde(rename = "x-request-parameters")]
    request_parameters: Option<BTreeMap<String, bool>>,
}

/// A parsed API specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiSpecification {
    /// `info.title`; used as the API name.
    pub title: String,
    /// `basePath`, or `""` when absent.
    pub base_path: String,
    /// Declared paths, in document order.
    pub paths: Vec<PathSpec>,
    /// Declared operations, in document order.
    pub operations: Vec<OperationSpec>,
}

impl ApiSpecification {
    /// Reads and parses a specification file.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Io`] if the file cannot be read, and otherwise
    /// the errors of [`ApiSpecification::parse`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded specification file");
        Self::parse(&contents)
    }

    /// Parses a specification document from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Parse`] for malformed YAML/JSON, and
    /// [`SpecError::InvalidDocument`] when the title is missing, a path does
    /// not start with `/`, or an operation's extension fields have the wrong
    /// type.
    pub fn parse(contents: &str) -> Result<Self, SpecError> {
        let document: Value = serde_yaml::from_str(contents)?;
        let root = document
            .as_mapping()
            .ok_or_else(|| SpecError::invalid("document must be a mapping"))?;

        let title = root
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| SpecError::invalid("info.title is required"))?
            .to_string();

        let base_path = match root.get("basePath") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(base)) if base.is_empty() || base.starts_with('/') => base.clone(),
            Some(other) => {
                return Err(SpecError::invalid(format!(
                    "basePath must be a string starting with '/', got {other:?}"
                )))
            }
        };

        let mut paths = Vec::new();
        let mut operations = Vec::new();

        if let Some(path_entries) = root.get("paths") {
            let path_entries = path_entries
                .as_mapping()
                .ok_or_else(|| SpecError::invalid("paths must be a mapping"))?;
            for (key, item) in path_entries {
                let raw_path = key
                    .as_str()
                    .ok_or_else(|| SpecError::invalid("path keys must be strings"))?;
                paths.push(PathSpec::parse(raw_path)?);
                operations.extend(parse_operations(raw_path, item)?);
            }
        }

        Ok(Self {
            title,
            base_path,
            paths,
            operations,
        })
    }
}

fn parse_operations(path: &str, item: &Value) -> Result<Vec<OperationSpec>, SpecError> {
    let entries: &Mapping = match item {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(entries) => entries,
        _ => {
            return Err(SpecError::invalid(format!(
                "path '{path}' must map to a mapping of operations"
            )))
        }
    };

    let canonical_path = PathSpec::parse(path)?.to_string();
    let mut operations = Vec::new();
    for (key, value) in entries {
        let Some(method) = key.as_str().map(str::to_lowercase) else {
            continue;
        };
        if !OPERATION_KEYS.contains(&method.as_str()) {
            continue;
        }

        let extensions: OperationExtensions = match value {
            Value::Null => OperationExtensions::default(),
            other => serde_yaml::from_value(other.clone()).map_err(|e| {
                SpecError::invalid(format!("{} {path}: {e}", method.to_uppercase()))
            })?,
        };

        operations.push(OperationSpec {
            http_method: method.to_uppercase(),
            path: canonical_path.clone(),
            api_key_required: extensions.api_key_required,
            authorization_type: extensions.authorization_type,
            request_models: extensions.request_models,
            request_parameters: extensions.request_parameters,
        });
    }
    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = r#"
swagger: "2.0"
info:
  title: Demo
  version: "1.0"
basePath: /v1
paths:
  /items:
    parameters:
      - name: trace
        in: header
    get:
      summary: List items
      x-api-key-required: true
    post:
      x-authorization-type: AWS_IAM
      x-request-models:
        application/json: Item
  /items/{id}:
    get:
      x-request-parameters:
        method.request.path.id: true
"#;

    #[test]
    fn test_path_spec_parse_and_display() {
        let path = PathSpec::parse("/a/b/c").unwrap();
        assert_eq!(path.segments(), &["a", "b", "c"]);
        assert_eq!(path.to_string(), "/a/b/c");

        let root = PathSpec::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "/");

        assert_eq!(PathSpec::parse("/a//b/").unwrap().to_string(), "/a/b");
    }

    #[test]
    fn test_path_spec_rejects_relative_path() {
        assert!(matches!(
            PathSpec::parse("items"),
            Err(SpecError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_parse_demo_document() {
        let spec = ApiSpecification::parse(DEMO).unwrap();

        assert_eq!(spec.title, "Demo");
        assert_eq!(spec.base_path, "/v1");
        let paths: Vec<String> = spec.paths.iter().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["/items", "/items/{id}"]);

        assert_eq!(spec.operations.len(), 3);
        let list = &spec.operations[0];
        assert_eq!(list.http_method, "GET");
        assert_eq!(list.path, "/items");
        assert_eq!(list.api_key_required, Some(true));
        assert_eq!(list.authorization_type, None);

        let create = &spec.operations[1];
        assert_eq!(create.http_method, "POST");
        assert_eq!(create.authorization_type.as_deref(), Some("AWS_IAM"));
        assert_eq!(
            create.request_models.as_ref().and_then(|m| m.get("application/json")),
            Some(&"Item".to_string())
        );

        let show = &spec.operations[2];
        assert_eq!(show.path, "/items/{id}");
        assert_eq!(
            show.request_parameters
                .as_ref()
                .and_then(|p| p.get("method.request.path.id")),
            Some(&true)
        );
        assert_eq!(show.request_models, None);
    }

    #[test]
    fn test_parse_json_document_without_base_path() {
        let spec = ApiSpecification::parse(
            r#"{"info": {"title": "Pets"}, "paths": {"/pets": {"get": {}}}}"#,
        )
        .unwrap();
        assert_eq!(spec.base_path, "");
        assert_eq!(spec.operations[0].http_method, "GET");
        assert_eq!(spec.operations[0].to_put_method_body(), PutMethodBody::default());
    }

    #[test]
    fn test_operation_paths_match_declared_paths() {
        let spec = ApiSpecification::parse(
            "info: {title: X}\npaths:\n  /items/:\n    get: {}\n  /a//b:\n    put: {}\n",
        )
        .unwrap();

        let paths: Vec<String> = spec.paths.iter().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["/items", "/a/b"]);
        let operation_paths: Vec<&str> = spec.operations.iter().map(|op| op.path.as_str()).collect();
        assert_eq!(operation_paths, vec!["/items", "/a/b"]);
    }

    #[test]
    fn test_missing_title_is_invalid() {
        let result = ApiSpecification::parse("paths: {}\n");
        assert!(matches!(result, Err(SpecError::InvalidDocument { reason }) if reason.contains("title")));
    }

    #[test]
    fn test_relative_path_key_is_invalid() {
        let result = ApiSpecification::parse("info: {title: X}\npaths:\n  items:\n    get: {}\n");
        assert!(matches!(result, Err(SpecError::InvalidDocument { .. })));
    }

    #[test]
    fn test_wrongly_typed_extension_is_invalid() {
        let result = ApiSpecification::parse(
            "info: {title: X}\npaths:\n  /a:\n    get:\n      x-api-key-required: [1]\n",
        );
        assert!(matches!(result, Err(SpecError::InvalidDocument { reason }) if reason.contains("GET /a")));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let result = ApiSpecification::parse("info: [unclosed");
        assert!(matches!(result, Err(SpecError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = ApiSpecification::load_from_file("/nonexistent/apigate/swagger.yml");
        assert!(matches!(result, Err(SpecError::Io { .. })));
    }
}
