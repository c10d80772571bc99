//! # apigate
//!
//! Deploys a declarative REST API description onto AWS API Gateway.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`DeployConfig`] and [`DeployConfigBuilder`]
//! - Validated newtypes for credentials, region, and endpoint
//! - Credential loading from the environment or a shared credentials file
//! - AWS Signature Version 4 request signing via [`SigningContext`]
//! - An async, signing HTTP client and a typed [`ManagementApiClient`]
//! - A specification loader for Swagger-style documents ([`ApiSpecification`])
//! - Resource tree synchronization and method attachment, sequenced by the
//!   [`DeploymentOrchestrator`]
//!
//! ## Quick Start
//!
//! ```rust
//! use apigate::{Credentials, DeployConfig};
//!
//! let config = DeployConfig::builder()
//!     .credentials(Credentials::new("AKIDEXAMPLE", "secret", "eu-west-1").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint().as_ref(), "https://apigateway.eu-west-1.amazonaws.com");
//! ```
//!
//! ## Deploying a Specification
//!
//! ```rust,ignore
//! use apigate::{ApiSpecification, DeployConfig, DeploymentOrchestrator, ManagementApiClient};
//! use apigate::auth::profile::load_credentials;
//!
//! let config = DeployConfig::builder()
//!     .credentials(load_credentials(None, None)?)
//!     .build()?;
//! let client = ManagementApiClient::new(&config)?;
//! let spec = ApiSpecification::load_from_file("swagger.yml")?;
//!
//! let report = DeploymentOrchestrator::new(&client, &config).run(&spec).await?;
//! println!("Created API {}", report.rest_api.id);
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration and clients are passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: Clients are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **No retries**: Every failure surfaces on the first attempt

pub mod auth;
pub mod clients;
pub mod config;
pub mod deploy;
pub mod error;
pub mod gateway;
pub mod spec;

// Re-export public types at crate root for convenience
pub use auth::{Credentials, SigningContext, SigningError};
pub use config::{
    AccessKeyId, DeployConfig, DeployConfigBuilder, EndpointUrl, Region, SecretAccessKey,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    DataType, HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError,
};

// Re-export deployment types
pub use deploy::{
    DeployError, DeployReport, DeployState, DeploymentOrchestrator, MethodAttacher,
    ResourceTreeSynchronizer,
};
pub use gateway::{ManagementApiClient, PutMethodBody, ResourceNode, RestApi};
pub use spec::{ApiSpecification, OperationSpec, PathSpec, SpecError};
