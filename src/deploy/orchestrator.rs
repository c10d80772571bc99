//! Deployment sequencing.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::DeployConfig;
use crate::deploy::methods::{MethodAttacher, MethodAttachment};
use crate::deploy::paths::join_base_path;
use crate::deploy::sync::ResourceTreeSynchronizer;
use crate::deploy::DeployError;
use crate::gateway::{ManagementApiClient, ResourceNode, RestApi};
use crate::spec::{ApiSpecification, OperationSpec};

/// Steps of a deployment, in order.
///
/// `Failed` is terminal and reachable from every step before `Done`. A failed
/// run returns an error rather than a report; [`DeployError::state`] yields
/// `Failed` and [`DeployError::failed_state`] names the step that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeployState {
    /// Create the REST API.
    CreateApi,
    /// Delete the scaffold models created with a new API.
    DeleteDefaultArtifacts,
    /// Create missing resources.
    SynchronizeResources,
    /// Attach methods to resources.
    AttachMethods,
    /// Every step completed.
    Done,
    /// A step failed. Reported through [`DeployError::state`].
    Failed,
}

impl DeployState {
    /// Returns the state that follows this one on success.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::CreateApi => Self::DeleteDefaultArtifacts,
            Self::DeleteDefaultArtifacts => Self::SynchronizeResources,
            Self::SynchronizeResources => Self::AttachMethods,
            Self::AttachMethods | Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    /// Returns `true` for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateApi => "CreateApi",
            Self::DeleteDefaultArtifacts => "DeleteDefaultArtifacts",
            Self::SynchronizeResources => "SynchronizeResources",
            Self::AttachMethods => "AttachMethods",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Outcome of deleting one scaffold model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The model was deleted.
    Deleted,
    /// The deletion failed; the deployment continued.
    Failed {
        /// Why it failed.
        reason: String,
    },
}

/// Result of deleting one scaffold model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactCleanup {
    /// Model name.
    pub model_name: String,
    /// What happened.
    pub outcome: CleanupOutcome,
}

impl ArtifactCleanup {
    /// Returns `true` if the model was deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.outcome == CleanupOutcome::Deleted
    }
}

/// Summary of a completed deployment.
#[derive(Clone, Debug)]
pub struct DeployReport {
    /// The created API.
    pub rest_api: RestApi,
    /// One entry per scaffold model, in deletion order.
    pub artifact_cleanup: Vec<ArtifactCleanup>,
    /// Resources created by this run, in creation order.
    pub created_resources: Vec<ResourceNode>,
    /// Every synchronized path (and prefix) to its node id.
    pub resolved_paths: BTreeMap<String, String>,
    /// Methods attached, in order.
    pub attachments: Vec<MethodAttachment>,
    /// Always [`DeployState::Done`] for a returned report.
    pub final_state: DeployState,
}

/// Runs a deployment: create API, delete scaffold models, synchronize
/// resources, attach methods.
///
/// Steps run sequentially. The first failure stops the run and is returned
/// as [`DeployError::PartialDeployment`]; nothing already applied is undone.
///
/// # Example
///
/// ```rust,ignore
/// use apigate::{ApiSpecification, DeployConfig, DeploymentOrchestrator, ManagementApiClient};
///
/// let client = ManagementApiClient::new(&config)?;
/// let spec = ApiSpecification::load_from_file("swagger.yml")?;
/// let report = DeploymentOrchestrator::new(&client, &config).run(&spec).await?;
/// println!("Deployed {}", report.rest_api.id);
/// ```
#[derive(Debug)]
pub struct DeploymentOrchestrator<'a> {
    client: &'a ManagementApiClient,
    default_model_names: Vec<String>,
}

#[derive(Debug, Default)]
struct Progress {
    last_completed: Option<DeployState>,
    rest_api_id: Option<String>,
}

impl Progress {
    fn complete(&mut self, state: DeployState) {
        tracing::info!(state = %state, "Deployment step completed");
        self.last_completed = Some(state);
    }

    fn fail(&self, state: DeployState, error: DeployError) -> DeployError {
        tracing::debug!(state = %state, error = %error, "Deployment step failed");
        DeployError::PartialDeployment {
            failed_state: state,
            last_completed: self.last_completed,
            rest_api_id: self.rest_api_id.clone(),
            source: Box::new(error),
        }
    }
}

impl<'a> DeploymentOrchestrator<'a> {
    /// Creates an orchestrator using the scaffold model names from `config`.
    #[must_use]
    pub fn new(client: &'a ManagementApiClient, config: &DeployConfig) -> Self {
        Self {
            client,
            default_model_names: config.default_model_names().to_vec(),
        }
    }

    /// Overrides the scaffold model names to delete.
    #[must_use]
    pub fn with_default_model_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_model_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Deploys `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::PartialDeployment`] carrying the failing state,
    /// the last completed state, the API id when known, and the cause.
    pub async fn run(&self, spec: &ApiSpecification) -> Result<DeployReport, DeployError> {
        let mut progress = Progress::default();

        let mut state = DeployState::CreateApi;
        tracing::info!(state = %state, title = %spec.title, "Creating REST API");
        let rest_api = self
            .client
            .create_rest_api(&spec.title)
            .await
            .map_err(|e| progress.fail(state, e.into()))?;
        tracing::info!(api_id = %rest_api.id, "Created REST API");
        progress.rest_api_id = Some(rest_api.id.clone());
        progress.complete(state);

        state = state.next();
        let artifact_cleanup = self.delete_default_artifacts(&rest_api.id).await;
        progress.complete(state);

        state = state.next();
        let targets: Vec<String> = spec
            .paths
            .iter()
            .map(|path| join_base_path(&spec.base_path, &path.to_string()))
            .collect();
        let (resolved_paths, created_resources) = self
            .synchronize(&rest_api.id, &targets)
            .await
            .map_err(|e| progress.fail(state, e))?;
        progress.complete(state);

        state = state.next();
        let operations: Vec<OperationSpec> = spec
            .operations
            .iter()
            .map(|operation| OperationSpec {
                path: join_base_path(&spec.base_path, &operation.path),
                ..operation.clone()
            })
            .collect();
        let attachments = MethodAttacher::new(self.client, &rest_api.id)
            .attach(&resolved_paths, &operations)
            .await
            .map_err(|e| progress.fail(state, e))?;
        progress.complete(state);

        state = state.next();
        tracing::info!(
            api_id = %rest_api.id,
            created = created_resources.len(),
            attached = attachments.len(),
            "Deployment finished"
        );

        Ok(DeployReport {
            rest_api,
            artifact_cleanup,
            created_resources,
            resolved_paths,
            attachments,
            final_state: state,
        })
    }

    async fn delete_default_artifacts(&self, api_id: &str) -> Vec<ArtifactCleanup> {
        let mut results = Vec::with_capacity(self.default_model_names.len());
        for model_name in &self.default_model_names {
            let outcome = match self.client.delete_model(api_id, model_name).await {
                Ok(()) => {
                    tracing::debug!(model = %model_name, "Deleted default model");
                    CleanupOutcome::Deleted
                }
                Err(e) => {
                    tracing::warn!(model = %model_name, error = %e, "Failed to delete default model");
                    CleanupOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            results.push(ArtifactCleanup {
                model_name: model_name.clone(),
                outcome,
            });
        }
        results
    }

    async fn synchronize(
        &self,
        api_id: &str,
        targets: &[String],
    ) -> Result<(BTreeMap<String, String>, Vec<ResourceNode>), DeployError> {
        let existing = self.client.list_resources(api_id).await?;
        let mut synchronizer = ResourceTreeSynchronizer::new(self.client, api_id, existing)?;
        let resolved = synchronizer.synchronize(targets).await?;
        Ok((resolved, synchronizer.into_created()))
    }
}
