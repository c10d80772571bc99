//! Resource tree synchronization.
//!
//! Walks each target path from the root, reusing nodes already present in
//! the remote tree and creating the ones that are missing.

use std::collections::{BTreeMap, HashMap};

use crate::deploy::paths::{last_segment, prefix_chain};
use crate::deploy::DeployError;
use crate::gateway::{ManagementApiClient, ResourceNode};

/// In-memory index of the remote resource tree, keyed by full path.
///
/// Seeded once from a listing and updated in place after each creation.
/// It is never re-fetched.
#[derive(Clone, Debug, Default)]
pub struct ResourceIndex {
    by_path: HashMap<String, ResourceNode>,
}

impl ResourceIndex {
    /// Builds an index from a listing of the remote tree.
    #[must_use]
    pub fn from_nodes(nodes: impl IntoIterator<Item = ResourceNode>) -> Self {
        let by_path = nodes
            .into_iter()
            .map(|node| (node.path.clone(), node))
            .collect();
        Self { by_path }
    }

    /// Returns the node at `path`, if indexed.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ResourceNode> {
        self.by_path.get(path)
    }

    /// Returns the root node, if indexed.
    #[must_use]
    pub fn root(&self) -> Option<&ResourceNode> {
        self.get("/")
    }

    /// Records `node` under `path`.
    pub fn insert(&mut self, path: impl Into<String>, node: ResourceNode) {
        self.by_path.insert(path.into(), node);
    }

    /// Returns the number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Brings a remote resource tree into agreement with a set of target paths.
///
/// Only missing nodes are created; shared prefixes are created at most once.
/// A failed creation aborts the run, leaving earlier creations in place.
///
/// A node that exists remotely but was absent from the seed listing is not
/// seen, so its creation is attempted again and typically rejected with 409.
#[derive(Debug)]
pub struct ResourceTreeSynchronizer<'a> {
    client: &'a ManagementApiClient,
    api_id: &'a str,
    root_id: String,
    index: ResourceIndex,
    created: Vec<ResourceNode>,
}

impl<'a> ResourceTreeSynchronizer<'a> {
    /// Creates a synchronizer seeded with a listing of the remote tree.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidResponse`] if the listing has no root.
    pub fn new(
        client: &'a ManagementApiClient,
        api_id: &'a str,
        existing: Vec<ResourceNode>,
    ) -> Result<Self, DeployError> {
        let index = ResourceIndex::from_nodes(existing);
        let root_id = index
            .root()
            .map(|root| root.id.clone())
            .ok_or_else(|| DeployError::InvalidResponse {
                reason: format!("resource listing for API {api_id} has no root node"),
            })?;

        Ok(Self {
            client,
            api_id,
            root_id,
            index,
            created: Vec::new(),
        })
    }

    /// Returns the root node id.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Returns the current index.
    #[must_use]
    pub const fn index(&self) -> &ResourceIndex {
        &self.index
    }

    /// Returns the nodes created so far, in creation order.
    #[must_use]
    pub fn created(&self) -> &[ResourceNode] {
        &self.created
    }

    /// Consumes the synchronizer, returning the nodes it created.
    #[must_use]
    pub fn into_created(self) -> Vec<ResourceNode> {
        self.created
    }

    /// Synchronizes `targets` in order.
    ///
    /// Returns a map from every target path and every intermediate prefix
    /// (plus `/`) to its node id.
    ///
    /// # Errors
    ///
    /// Returns the first creation failure, classified as a [`DeployError`].
    pub async fn synchronize<S: AsRef<str>>(
        &mut self,
        targets: &[S],
    ) -> Result<BTreeMap<String, String>, DeployError> {
        let mut resolved = BTreeMap::new();
        resolved.insert("/".to_string(), self.root_id.clone());

        for target in targets {
            let mut parent_id = self.root_id.clone();

            for prefix in prefix_chain(target.as_ref()) {
                let node_id = if let Some(node) = self.index.get(&prefix) {
                    tracing::debug!(path = %prefix, id = %node.id, "Reusing resource");
                    node.id.clone()
                } else {
                    let node = self
                        .client
                        .create_resource(self.api_id, &parent_id, last_segment(&prefix))
                        .await?;
                    tracing::debug!(path = %prefix, id = %node.id, parent_id = %parent_id, "Created resource");
                    let id = node.id.clone();
                    self.index.insert(prefix.clone(), node.clone());
                    self.created.push(node);
                    id
                };

                resolved.insert(prefix, node_id.clone());
                parent_id = node_id;
            }
        }

        Ok(resolved)
    }
}
