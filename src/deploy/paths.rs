//! Resource path helpers.

/// Decomposes a path into its ordered prefix chain.
///
/// The root (`/`) has an empty chain. Empty segments are ignored.
///
/// # Example
///
/// ```rust
/// use apigate::deploy::prefix_chain;
///
/// assert_eq!(prefix_chain("/a/b/c"), vec!["/a", "/a/b", "/a/b/c"]);
/// assert!(prefix_chain("/").is_empty());
/// ```
#[must_use]
pub fn prefix_chain(path: &str) -> Vec<String> {
    let mut prefix = String::new();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            prefix.push('/');
            prefix.push_str(segment);
            prefix.clone()
        })
        .collect()
}

/// Returns the last segment of a path (`""` for the root).
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("")
}

/// Prefixes `path` with `base_path`, producing a canonical resource path.
///
/// Empty segments on either side are dropped, so `/v1/` joined with `/a//b`
/// yields `/v1/a/b`. An empty base path (or `/`) leaves `path` unchanged; the
/// root path maps to the base path itself.
///
/// ```rust
/// use apigate::deploy::join_base_path;
///
/// assert_eq!(join_base_path("/v1", "/items"), "/v1/items");
/// assert_eq!(join_base_path("/v1/", "/"), "/v1");
/// assert_eq!(join_base_path("", "/items/"), "/items");
/// ```
#[must_use]
pub fn join_base_path(base_path: &str, path: &str) -> String {
    let segments: Vec<&str> = base_path
        .split('/')
        .chain(path.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}
