//! Deployment engines.
//!
//! - [`ResourceTreeSynchronizer`]: creates the resources a set of paths needs
//! - [`MethodAttacher`]: attaches operations to synchronized resources
//! - [`DeploymentOrchestrator`]: sequences a full deployment
//!
//! All remote calls are made one at a time, in order, and none is retried.

mod errors;
mod methods;
mod orchestrator;
mod paths;
mod sync;

pub use errors::DeployError;
pub use methods::{MethodAttacher, MethodAttachment};
pub use orchestrator::{
    ArtifactCleanup, CleanupOutcome, DeployReport, DeployState, DeploymentOrchestrator,
};
pub use paths::{join_base_path, last_segment, prefix_chain};
pub use sync::{ResourceIndex, ResourceTreeSynchronizer};
