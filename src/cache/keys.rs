//! Cache key definitions.
//!
//! A response is keyed by the request's normalized URL: path alone, or
//! path + `?` + query when a query string is present. The cache is blind to
//! what the response contains; the key namespace is the only structure.

use axum::http::Uri;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey(String);

impl ResponseKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build a key from a request URI: `/path` or `/path?query`.
    pub fn from_uri(uri: &Uri) -> Self {
        match uri.query() {
            Some(query) if !query.is_empty() => Self(format!("{}?{}", uri.path(), query)),
            _ => Self(uri.path().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix match over the path component; a listing prefix such as
    /// `/api/v1/ponds` also covers `/api/v1/ponds?lang=th` and
    /// `/api/v1/ponds/{id}/readings`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_only_key() {
        let uri: Uri = "/api/v1/ponds".parse().expect("uri");
        assert_eq!(ResponseKey::from_uri(&uri).as_str(), "/api/v1/ponds");
    }

    #[test]
    fn query_is_part_of_the_key() {
        let uri: Uri = "/api/v1/ponds?lang=th".parse().expect("uri");
        assert_eq!(
            ResponseKey::from_uri(&uri).as_str(),
            "/api/v1/ponds?lang=th"
        );
    }

    #[test]
    fn distinct_queries_are_distinct_keys() {
        let a: Uri = "/api/v1/items?category=feed".parse().expect("uri");
        let b: Uri = "/api/v1/items?category=fuel".parse().expect("uri");
        assert_ne!(ResponseKey::from_uri(&a), ResponseKey::from_uri(&b));
    }

    #[test]
    fn prefix_covers_query_and_children() {
        let list = ResponseKey::new("/api/v1/ponds?lang=th");
        let child = ResponseKey::new("/api/v1/ponds/abc/readings");
        assert!(list.starts_with("/api/v1/ponds"));
        assert!(child.starts_with("/api/v1/ponds"));
        assert!(!child.starts_with("/api/v1/inventory"));
    }
}
