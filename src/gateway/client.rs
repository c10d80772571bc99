//! Typed client for the management API calls used by a deployment.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::clients::{DataType, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
use crate::config::DeployConfig;
use crate::gateway::types::{ListPage, PutMethodBody, ResourceNode, RestApi};

/// Page size requested when listing resources.
pub const RESOURCE_PAGE_LIMIT: u32 = 500;

/// Management API client.
///
/// Wraps a signing [`HttpClient`] and exposes one method per remote call.
/// Every call is awaited to completion and never retried; connection reuse
/// is handled by the underlying client.
///
/// # Thread Safety
///
/// `ManagementApiClient` is `Send + Sync`.
///
/// # Example
///
/// ```rust,ignore
/// use apigate::{Credentials, DeployConfig, ManagementApiClient};
///
/// let config = DeployConfig::builder()
///     .credentials(Credentials::new("AKID", "secret", "eu-west-1")?)
///     .build()?;
/// let client = ManagementApiClient::new(&config)?;
///
/// let api = client.create_rest_api("Demo").await?;
/// let nodes = client.list_resources(&api.id).await?;
/// ```
#[derive(Debug)]
pub struct ManagementApiClient {
    http_client: HttpClient,
}

// Verify ManagementApiClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ManagementApiClient>();
};

impl ManagementApiClient {
    /// Creates a client for the configured endpoint and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &DeployConfig) -> Result<Self, HttpError> {
        Ok(Self {
            http_client: HttpClient::new(config)?,
        })
    }

    /// Returns the underlying signing HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Creates a REST API with the given display name.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, a non-2xx response, or a
    /// response without an `id`.
    pub async fn create_rest_api(&self, name: &str) -> Result<RestApi, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Post, "/restapis")
            .body(json!({ "name": name }))
            .body_type(DataType::Json)
            .build()?;

        let response = self.http_client.request(request).await?;
        decode(response, "create rest api")
    }

    /// Deletes a model from an API.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure or a non-2xx response
    /// (e.g. 404 when the model does not exist).
    pub async fn delete_model(&self, api_id: &str, model_name: &str) -> Result<(), HttpError> {
        let path = format!(
            "/restapis/{}/models/{}",
            urlencoding::encode(api_id),
            urlencoding::encode(model_name)
        );
        let request = HttpRequest::builder(HttpMethod::Delete, path).build()?;

        self.http_client.request(request).await?;
        Ok(())
    }

    /// Lists every resource of an API, following pagination.
    ///
    /// Paging stops when the service hands back a `position` token that was
    /// already requested.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if any page fails or cannot be decoded. No
    /// partial listing is returned.
    pub async fn list_resources(&self, api_id: &str) -> Result<Vec<ResourceNode>, HttpError> {
        let path = format!("/restapis/{}/resources", urlencoding::encode(api_id));
        let mut nodes = Vec::new();
        let mut position: Option<String> = None;
        let mut requested: HashSet<String> = HashSet::new();

        loop {
            let mut builder = HttpRequest::builder(HttpMethod::Get, path.as_str())
                .query_param("limit", RESOURCE_PAGE_LIMIT.to_string());
            if let Some(token) = position.take() {
                requested.insert(token.clone());
                builder = builder.query_param("position", token);
            }

            let response = self.http_client.request(builder.build()?).await?;
            let page: ListPage<ResourceNode> = decode(response, "list resources")?;
            let (items, next) = page.into_parts();

            tracing::debug!(api_id, count = items.len(), "Fetched resource page");
            nodes.extend(items);

            match next {
                Some(token) if requested.contains(&token) => {
                    tracing::warn!(
                        api_id,
                        position = %token,
                        "Resource listing repeated a position; stopping"
                    );
                    break;
                }
                Some(token) => position = Some(token),
                None => break,
            }
        }

        Ok(nodes)
    }

    /// Creates a child resource under `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure or a non-2xx response
    /// (409 when the parent already has a child with this path part).
    pub async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<ResourceNode, HttpError> {
        let path = format!(
            "/restapis/{}/resources/{}",
            urlencoding::encode(api_id),
            urlencoding::encode(parent_id)
        );
        let request = HttpRequest::builder(HttpMethod::Post, path)
            .body(json!({ "pathPart": path_part }))
            .body_type(DataType::Json)
            .build()?;

        let response = self.http_client.request(request).await?;
        decode(response, "create resource")
    }

    /// Attaches (or overwrites) a method on a resource.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, a non-2xx response, or a
    /// body that cannot be serialized.
    pub async fn put_method(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        body: &PutMethodBody,
    ) -> Result<HttpResponse, HttpError> {
        let path = format!(
            "/restapis/{}/resources/{}/methods/{}",
            urlencoding::encode(api_id),
            urlencoding::encode(resource_id),
            http_method.to_uppercase()
        );
        let body = serde_json::to_value(body).map_err(|source| HttpError::Decode {
            context: "put method body".to_string(),
            source,
        })?;
        let request = HttpRequest::builder(HttpMethod::Put, path)
            .body(body)
            .body_type(DataType::Json)
            .build()?;

        self.http_client.request(request).await
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse, context: &str) -> Result<T, HttpError> {
    serde_json::from_value(response.body).map_err(|source| HttpError::Decode {
        context: context.to_string(),
        source,
    })
}
