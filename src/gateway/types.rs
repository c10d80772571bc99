//! Wire types for the management API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A REST API created on the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RestApi {
    /// Remote id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// A node in the remote resource tree.
///
/// The root node has path `/` and neither a parent id nor a path part.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    /// Remote id.
    pub id: String,
    /// Full path, e.g. `/v1/items`.
    pub path: String,
    /// Id of the parent node (absent on the root).
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Last path segment (absent on the root).
    #[serde(default)]
    pub path_part: Option<String>,
}

impl ResourceNode {
    /// Returns `true` for the tree root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path == "/"
    }
}

/// Body of a method attachment (`PUT .../methods/{HTTP_METHOD}`).
///
/// Fields left as `None` are omitted from the serialized JSON.
///
/// # Example
///
/// ```rust
/// use apigate::gateway::PutMethodBody;
///
/// let body = PutMethodBody {
///     api_key_required: Some(true),
///     ..PutMethodBody::default()
/// };
/// assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"apiKeyRequired":true}"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutMethodBody {
    /// Whether an API key is required to call the method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_required: Option<bool>,
    /// Authorization type, e.g. `NONE` or `AWS_IAM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_type: Option<String>,
    /// Content type to model name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_models: Option<BTreeMap<String, String>>,
    /// Request parameter name to required flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_parameters: Option<BTreeMap<String, bool>>,
}

/// One or many values; single-item HAL pages embed an object, not an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Embedded<T> {
    pub(crate) item: Option<OneOrMany<T>>,
}

/// A page of a collection listing, in either the JSON protocol or HAL shape.
#[derive(Debug, Deserialize)]
pub(crate) struct ListPage<T> {
    items: Option<Vec<T>>,
    #[serde(rename = "_embedded")]
    embedded: Option<Embedded<T>>,
    position: Option<String>,
}

impl<T> ListPage<T> {
    /// Splits the page into its items and the token for the next page.
    pub(crate) fn into_parts(self) -> (Vec<T>, Option<String>) {
        let items = match (self.items, self.embedded) {
            (Some(items), _) => items,
            (None, Some(embedded)) => embedded.item.map(OneOrMany::into_vec).unwrap_or_default(),
            (None, None) => Vec::new(),
        };
        let position = self.position.filter(|p| !p.is_empty());
        (items, position)
    }
}
