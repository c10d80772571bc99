//! Deployment error types.
//!
//! [`DeployError`] classifies every failure a deployment can hit:
//!
//! - [`DeployError::Authentication`]: bad or missing credentials, or a 401/403
//! - [`DeployError::Transport`]: the remote could not be reached
//! - [`DeployError::RemoteRejection`]: any other non-2xx response
//! - [`DeployError::Specification`]: the specification cannot be deployed
//! - [`DeployError::PartialDeployment`]: a deployment stopped part way
//!
//! Nothing is retried.

use thiserror::Error;

use crate::clients::HttpError;
use crate::deploy::DeployState;
use crate::error::ConfigError;
use crate::spec::SpecError;

/// Errors raised by the deployment engines.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Credentials are missing or were rejected by the remote service.
    #[error("Authentication failed: {reason}")]
    Authentication {
        /// Description of the failure.
        reason: String,
    },

    /// Network or connection failure.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("Remote rejected request with {code} {}: {message}", .error_type.as_deref().unwrap_or("Error"))]
    RemoteRejection {
        /// HTTP status code.
        code: u16,
        /// Message from the response body.
        message: String,
        /// Remote error type, if reported.
        error_type: Option<String>,
        /// Remote request id, if reported.
        request_id: Option<String>,
    },

    /// The specification references something that cannot be deployed, or
    /// the document itself is malformed.
    #[error("Specification error: {reason}")]
    Specification {
        /// Description of the problem.
        reason: String,
    },

    /// A configuration value other than credentials is invalid.
    #[error(transparent)]
    Configuration(ConfigError),

    /// A request could not be built or a response could not be understood.
    #[error("Invalid exchange with the management API: {reason}")]
    InvalidResponse {
        /// Description of the problem.
        reason: String,
    },

    /// The orchestrator aborted; earlier steps remain applied remotely.
    #[error(
        "Deployment failed during {failed_state} (last completed: {}){}: {source}",
        .last_completed.map_or_else(|| "none".to_string(), |s| s.to_string()),
        .rest_api_id.as_ref().map_or_else(String::new, |id| format!(" for API {id}"))
    )]
    PartialDeployment {
        /// The state that failed.
        failed_state: DeployState,
        /// The last state that completed, if any.
        last_completed: Option<DeployState>,
        /// Id of the created API, when creation succeeded.
        rest_api_id: Option<String>,
        /// The underlying failure.
        #[source]
        source: Box<DeployError>,
    },
}

impl DeployError {
    /// Returns the underlying failure of a `PartialDeployment`, or `self`.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::PartialDeployment { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the terminal state of the run that produced this error.
    ///
    /// Always [`DeployState::Failed`]. A run that succeeds reports
    /// [`DeployState::Done`] through its `DeployReport` instead.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn state(&self) -> DeployState {
        DeployState::Failed
    }

    /// Returns the step that failed, when the orchestrator raised this error.
    #[must_use]
    pub const fn failed_state(&self) -> Option<DeployState> {
        match self {
            Self::PartialDeployment { failed_state, .. } => Some(*failed_state),
            _ => None,
        }
    }

    pub(crate) fn specification(reason: impl Into<String>) -> Self {
        Self::Specification {
            reason: reason.into(),
        }
    }
}

impl From<HttpError> for DeployError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Authentication(e) => Self::Authentication {
                reason: e.to_string(),
            },
            HttpError::Response(e) => Self::RemoteRejection {
                code: e.code,
                message: e.message,
                error_type: e.error_type,
                request_id: e.request_id,
            },
            HttpError::Network(e) => Self::Transport(e),
            other @ (HttpError::InvalidRequest(_)
            | HttpError::Signing(_)
            | HttpError::Decode { .. }) => Self::InvalidResponse {
                reason: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for DeployError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::EmptyAccessKeyId
            | ConfigError::EmptySecretAccessKey
            | ConfigError::CredentialsNotFound { .. }
            | ConfigError::CredentialsFileUnreadable { .. } => Self::Authentication {
                reason: error.to_string(),
            },
            other => Self::Configuration(other),
        }
    }
}

impl From<SpecError> for DeployError {
    fn from(error: SpecError) -> Self {
        Self::specification(error.to_string())
    }
}
