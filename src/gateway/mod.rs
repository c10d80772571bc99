//! Management API client and wire types.
//!
//! - [`ManagementApiClient`]: one method per remote call (create API, delete
//!   model, list/create resources, put method)
//! - [`RestApi`], [`ResourceNode`], [`PutMethodBody`]: request and response
//!   shapes

mod client;
mod types;

pub use client::{ManagementApiClient, RESOURCE_PAGE_LIMIT};
pub use types::{PutMethodBody, ResourceNode, RestApi};
