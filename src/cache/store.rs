//! Response cache storage.
//!
//! A bounded LRU map of buffered responses. Each entry carries a TTL
//! deadline computed at insertion; an expired entry is indistinguishable
//! from an absent one. At most one entry exists per key, and invalidation
//! removes an entry whole.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;
use lru::LruCache;

use super::config::CacheConfig;
use super::keys::ResponseKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A fully buffered response ready to be replayed to a client.
#[derive(Clone)]
pub struct CachedResponse {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        let mut stored_headers = Vec::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            stored_headers.push((name.clone(), value.clone()));
        }

        Self {
            status,
            headers: stored_headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.clear();
        for (name, value) in self.headers {
            headers.append(name, value);
        }

        response
    }
}

struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide response store. Constructed once and shared by handle;
/// never a module-level singleton.
pub struct ResponseStore {
    entries: RwLock<LruCache<ResponseKey, Entry>>,
}

impl ResponseStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.response_limit_non_zero())),
        }
    }

    /// Fetch a live entry. Expired entries are treated as absent and
    /// dropped on the way out.
    pub fn get(&self, key: &ResponseKey) -> Option<CachedResponse> {
        let now = Instant::now();
        let mut guard = rw_write(&self.entries, SOURCE, "get");
        let expired = match guard.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.response.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            guard.pop(key);
        }
        None
    }

    /// Store or overwrite the entry under `key` with a fresh deadline.
    pub fn insert(&self, key: ResponseKey, response: CachedResponse, ttl: Duration) {
        let entry = Entry {
            response,
            expires_at: Instant::now() + ttl,
        };
        rw_write(&self.entries, SOURCE, "insert").put(key, entry);
    }

    /// Remove exactly one entry; returns whether an entry existed. Calling
    /// on an absent key is not an error.
    pub fn invalidate(&self, key: &ResponseKey) -> bool {
        rw_write(&self.entries, SOURCE, "invalidate")
            .pop(key)
            .is_some()
    }

    /// Remove every entry whose key starts with `prefix`; returns how many
    /// were removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut guard = rw_write(&self.entries, SOURCE, "invalidate_prefix");
        let matching: Vec<ResponseKey> = guard
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            guard.pop(key);
        }
        matching.len()
    }

    /// Clear every entry unconditionally.
    pub fn invalidate_all(&self) {
        rw_write(&self.entries, SOURCE, "invalidate_all").clear();
    }

    /// Drop entries past their deadline; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = rw_write(&self.entries, SOURCE, "purge_expired");
        let expired: Vec<ResponseKey> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            guard.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_limit(limit: usize) -> ResponseStore {
        ResponseStore::new(&CacheConfig {
            response_limit: limit,
            ..Default::default()
        })
    }

    fn cached_json(body: &str) -> CachedResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        CachedResponse::new(StatusCode::OK, &headers, Bytes::from(body.to_string()))
    }

    const TTL: Duration = Duration::from_secs(600);

    #[test]
    fn set_then_get_returns_same_payload() {
        let store = store_with_limit(16);
        let key = ResponseKey::new("/api/v1/ponds");

        store.insert(key.clone(), cached_json(r#"[{"id":1}]"#), TTL);

        let cached = store.get(&key).expect("cached response");
        assert_eq!(cached.status(), StatusCode::OK);
        assert_eq!(cached.body(), &Bytes::from(r#"[{"id":1}]"#));
    }

    #[test]
    fn unknown_key_is_absent() {
        let store = store_with_limit(16);
        assert!(store.get(&ResponseKey::new("/nowhere")).is_none());
    }

    #[test]
    fn zero_ttl_entry_is_absent_immediately() {
        let store = store_with_limit(16);
        let key = ResponseKey::new("/api/v1/ponds");

        store.insert(key.clone(), cached_json("[]"), Duration::ZERO);

        assert!(store.get(&key).is_none());
        // the expired entry was dropped on read
        assert!(store.is_empty());
    }

    #[test]
    fn insert_overwrites_existing_entry() {
        let store = store_with_limit(16);
        let key = ResponseKey::new("/api/v1/ponds");

        store.insert(key.clone(), cached_json("old"), TTL);
        store.insert(key.clone(), cached_json("new"), TTL);

        assert_eq!(store.len(), 1);
        let cached = store.get(&key).expect("cached response");
        assert_eq!(cached.body(), &Bytes::from("new"));
    }

    #[test]
    fn invalidate_reports_whether_entry_existed() {
        let store = store_with_limit(16);
        let key = ResponseKey::new("/api/v1/ponds");

        assert!(!store.invalidate(&key));
        store.insert(key.clone(), cached_json("[]"), TTL);
        assert!(store.invalidate(&key));
        assert!(!store.invalidate(&key));
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn invalidate_beats_ttl() {
        let store = store_with_limit(16);
        let key = ResponseKey::new("/api/v1/ponds");

        store.insert(key.clone(), cached_json("[]"), TTL);
        store.invalidate(&key);

        // well before the 600s deadline, yet absent
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn prefix_invalidation_spares_other_namespaces() {
        let store = store_with_limit(16);
        store.insert(ResponseKey::new("/api/v1/ponds"), cached_json("a"), TTL);
        store.insert(
            ResponseKey::new("/api/v1/ponds?lang=th"),
            cached_json("b"),
            TTL,
        );
        store.insert(
            ResponseKey::new("/api/v1/ponds/p1/readings"),
            cached_json("c"),
            TTL,
        );
        store.insert(
            ResponseKey::new("/api/v1/inventory/items"),
            cached_json("d"),
            TTL,
        );

        let removed = store.invalidate_prefix("/api/v1/ponds");

        assert_eq!(removed, 3);
        assert!(store.get(&ResponseKey::new("/api/v1/ponds")).is_none());
        assert!(
            store
                .get(&ResponseKey::new("/api/v1/inventory/items"))
                .is_some()
        );
    }

    #[test]
    fn invalidate_all_clears_everything() {
        let store = store_with_limit(16);
        store.insert(ResponseKey::new("/a"), cached_json("a"), TTL);
        store.insert(ResponseKey::new("/b"), cached_json("b"), TTL);

        store.invalidate_all();

        assert!(store.is_empty());
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let store = store_with_limit(16);
        store.insert(ResponseKey::new("/live"), cached_json("a"), TTL);
        store.insert(ResponseKey::new("/dead"), cached_json("b"), Duration::ZERO);

        let purged = store.purge_expired();

        assert_eq!(purged, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&ResponseKey::new("/live")).is_some());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let store = store_with_limit(2);
        store.insert(ResponseKey::new("/a"), cached_json("a"), TTL);
        store.insert(ResponseKey::new("/b"), cached_json("b"), TTL);
        store.insert(ResponseKey::new("/c"), cached_json("c"), TTL);

        assert!(store.get(&ResponseKey::new("/a")).is_none());
        assert!(store.get(&ResponseKey::new("/b")).is_some());
        assert!(store.get(&ResponseKey::new("/c")).is_some());
    }
}
