//! Method attachment.

use std::collections::BTreeMap;

use crate::deploy::DeployError;
use crate::gateway::{ManagementApiClient, PutMethodBody};
use crate::spec::OperationSpec;

/// A method attached to a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodAttachment {
    /// Uppercase HTTP method.
    pub http_method: String,
    /// Full resource path the method was attached to.
    pub path: String,
    /// Remote id of that resource.
    pub resource_id: String,
}

/// Attaches operation definitions to synchronized resources.
#[derive(Debug)]
pub struct MethodAttacher<'a> {
    client: &'a ManagementApiClient,
    api_id: &'a str,
}

impl<'a> MethodAttacher<'a> {
    /// Creates an attacher for one API.
    #[must_use]
    pub const fn new(client: &'a ManagementApiClient, api_id: &'a str) -> Self {
        Self { client, api_id }
    }

    /// Attaches every operation to the resource its path resolves to.
    ///
    /// Every operation is resolved before the first call is made, so an
    /// unknown path leaves the remote API untouched. Calls are issued in the
    /// order given and are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Specification`] if an operation's path is not
    /// in `resolved`, or the first remote failure otherwise.
    pub async fn attach(
        &self,
        resolved: &BTreeMap<String, String>,
        operations: &[OperationSpec],
    ) -> Result<Vec<MethodAttachment>, DeployError> {
        let planned: Vec<(MethodAttachment, PutMethodBody)> = operations
            .iter()
            .map(|operation| {
                let resource_id = resolved.get(&operation.path).ok_or_else(|| {
                    DeployError::specification(format!(
                        "{} {} references a path that was not synchronized",
                        operation.http_method, operation.path
                    ))
                })?;
                let attachment = MethodAttachment {
                    http_method: operation.http_method.to_uppercase(),
                    path: operation.path.clone(),
                    resource_id: resource_id.clone(),
                };
                Ok((attachment, operation.to_put_method_body()))
            })
            .collect::<Result<_, DeployError>>()?;

        let mut attached = Vec::with_capacity(planned.len());
        for (attachment, body) in planned {
            self.client
                .put_method(
                    self.api_id,
                    &attachment.resource_id,
                    &attachment.http_method,
                    &body,
                )
                .await?;
            tracing::debug!(
                method = %attachment.http_method,
                path = %attachment.path,
                resource_id = %attachment.resource_id,
                "Attached method"
            );
            attached.push(attachment);
        }

        Ok(attached)
    }
}
