//! Integration tests for resource tree synchronization.
//!
//! Tests cover:
//! - Minimal creation for shared prefixes
//! - Reuse of nodes present in the seed listing
//! - Resolution of intermediate prefixes
//! - The stale-index behavior (no re-listing mid-run)
//! - Abort on the first failed creation

use apigate::{
    Credentials, DeployConfig, DeployError, EndpointUrl, ManagementApiClient, ResourceNode,
    ResourceTreeSynchronizer,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ManagementApiClient {
    let config = DeployConfig::builder()
        .credentials(Credentials::new("AKIDEXAMPLE", "test-secret", "us-east-1").unwrap())
        .endpoint(EndpointUrl::new(server.uri()).unwrap())
        .build()
        .unwrap();
    ManagementApiClient::new(&config).unwrap()
}

fn node(id: &str, full_path: &str, parent: Option<&str>) -> ResourceNode {
    ResourceNode {
        id: id.to_string(),
        path: full_path.to_string(),
        parent_id: parent.map(String::from),
        path_part: full_path.rsplit('/').next().filter(|s| !s.is_empty()).map(String::from),
    }
}

fn root() -> ResourceNode {
    node("r0", "/", None)
}

async fn mount_creation(server: &MockServer, parent: &str, part: &str, id: &str, full: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/restapis/a1/resources/{parent}")))
        .and(body_json(json!({"pathPart": part})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": id, "parentId": parent, "pathPart": part, "path": full
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn post_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.to_string() == "POST")
        .count()
}

// ============================================================================
// Minimality and resolution
// ============================================================================

#[tokio::test]
async fn test_shared_prefix_is_created_once() {
    let server = MockServer::start().await;
    mount_creation(&server, "r0", "a", "na", "/a").await;
    mount_creation(&server, "na", "b", "nb", "/a/b").await;
    mount_creation(&server, "na", "c", "nc", "/a/c").await;

    let client = client_for(&server);
    let mut synchronizer = ResourceTreeSynchronizer::new(&client, "a1", vec![root()]).unwrap();
    let resolved = synchronizer.synchronize(&["/a/b", "/a/c"]).await.unwrap();

    let created: Vec<&str> = synchronizer
        .created()
        .iter()
        .map(|n| n.path.as_str())
        .collect();
    assert_eq!(created, vec!["/a", "/a/b", "/a/c"]);
    assert_eq!(post_count(&server).await, 3);

    assert_eq!(resolved.get("/"), Some(&"r0".to_string()));
    assert_eq!(resolved.get("/a"), Some(&"na".to_string()));
    assert_eq!(resolved.get("/a/b"), Some(&"nb".to_string()));
    assert_eq!(resolved.get("/a/c"), Some(&"nc".to_string()));
    assert_eq!(resolved.len(), 4);
}

#[tokio::test]
async fn test_intermediate_prefixes_are_resolved() {
    let server = MockServer::start().await;
    mount_creation(&server, "e1", "b", "nb", "/a/b").await;

    let client = client_for(&server);
    let existing = vec![root(), node("e1", "/a", Some("r0"))];
    let mut synchronizer = ResourceTreeSynchronizer::new(&client, "a1", existing).unwrap();
    let resolved = synchronizer.synchronize(&["/a/b"]).await.unwrap();

    assert_eq!(resolved.get("/a"), Some(&"e1".to_string()));
    assert_eq!(resolved.get("/a/b"), Some(&"nb".to_string()));
    assert_eq!(synchronizer.created().len(), 1);
    assert_eq!(synchronizer.index().get("/a/b").map(|n| n.id.as_str()), Some("nb"));
}

#[tokio::test]
async fn test_existing_tree_needs_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let existing = vec![
        root(),
        node("e1", "/a", Some("r0")),
        node("e2", "/a/b", Some("e1")),
    ];
    let mut synchronizer = ResourceTreeSynchronizer::new(&client, "a1", existing).unwrap();
    let resolved = synchronizer.synchronize(&["/a/b", "/a"]).await.unwrap();

    assert!(synchronizer.created().is_empty());
    assert_eq!(resolved.get("/a/b"), Some(&"e2".to_string()));
}

#[tokio::test]
async fn test_root_target_resolves_to_root() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let mut synchronizer = ResourceTreeSynchronizer::new(&client, "a1", vec![root()]).unwrap();
    let resolved = synchronizer.synchronize(&["/"]).await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved.get("/"), Some(&"r0".to_string()));
    assert_eq!(synchronizer.root_id(), "r0");
}

// ============================================================================
// Stale index and failures
// ============================================================================

#[tokio::test]
async fn test_node_missing_from_listing_is_created_again() {
    let server = MockServer::start().await;
    // "/a" exists remotely but was created after the listing was taken.
    Mock::given(method("POST"))
        .and(path("/restapis/a1/resources/r0"))
        .and(body_json(json!({"pathPart": "a"})))
        .respond_with(
            ResponseTemplate::new(409)
                .insert_header("x-amzn-ErrorType", "ConflictException")
                .set_body_json(json!({
                    "message": "Another resource with the same parent already has this name: a"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/restapis/a1/resources/r0"))
        .and(body_json(json!({"pathPart": "c"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut synchronizer = ResourceTreeSynchronizer::new(&client, "a1", vec![root()]).unwrap();
    let result = synchronizer.synchronize(&["/a/b", "/c"]).await;

    match result {
        Err(DeployError::RemoteRejection {
            code, error_type, ..
        }) => {
            assert_eq!(code, 409);
            assert_eq!(error_type.as_deref(), Some("ConflictException"));
        }
        other => panic!("Expected RemoteRejection, got: {other:?}"),
    }
    assert!(synchronizer.created().is_empty());
    assert_eq!(post_count(&server).await, 1);
}

#[tokio::test]
async fn test_failed_creation_keeps_earlier_creations() {
    let server = MockServer::start().await;
    mount_creation(&server, "r0", "a", "na", "/a").await;
    Mock::given(method("POST"))
        .and(path("/restapis/a1/resources/r0"))
        .and(body_json(json!({"pathPart": "b"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut synchronizer = ResourceTreeSynchronizer::new(&client, "a1", vec![root()]).unwrap();
    let result = synchronizer.synchronize(&["/a", "/b"]).await;

    assert!(matches!(
        result,
        Err(DeployError::RemoteRejection { code: 500, .. })
    ));
    let created: Vec<&str> = synchronizer
        .created()
        .iter()
        .map(|n| n.path.as_str())
        .collect();
    assert_eq!(created, vec!["/a"]);
}

#[tokio::test]
async fn test_listing_without_root_is_rejected() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let result = ResourceTreeSynchronizer::new(&client, "a1", vec![node("e1", "/a", Some("r0"))]);
    assert!(matches!(result, Err(DeployError::InvalidResponse { .. })));
}
