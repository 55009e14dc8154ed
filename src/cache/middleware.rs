//! Response cache middleware.
//!
//! Applied as an explicit layer around the read API. GET requests are looked
//! up by normalized path + query; hits short-circuit the handler, misses run
//! it and tee the buffered body into the store. Cache trouble never fails a
//! request: anything un-bufferable is delivered uncached.
//!
//! No cache-status header is added to responses.

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{Method, Request, header},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::{debug, instrument, warn};

use super::{
    CacheConfig, ResponseStore,
    keys::ResponseKey,
    store::CachedResponse,
};

/// Shared cache state for middleware.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<ResponseStore>,
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enabled {
        return next.run(request).await;
    }

    // Only GET responses are memoized.
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = ResponseKey::from_uri(request.uri());

    if let Some(cached) = cache.store.get(&key) {
        counter!("stagno_cache_hit_total").increment(1);
        debug!(cache_key = %key, outcome = "hit", "serving cached response");
        return cached.into_response();
    }

    counter!("stagno_cache_miss_total").increment(1);
    debug!(cache_key = %key, outcome = "miss", "cache miss, executing handler");

    let response = next.run(request).await;

    if !should_store_response(&response, cache.config.max_body_bytes) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, cache.config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(
                cache_key = %key,
                error = %error,
                "failed to buffer response body; delivering uncached"
            );
            return Response::from_parts(parts, Body::empty());
        }
    };

    let cached = CachedResponse::new(parts.status, &parts.headers, bytes.clone());
    cache.store.insert(key, cached, cache.config.ttl());
    counter!("stagno_cache_store_total").increment(1);

    Response::from_parts(parts, Body::from(bytes))
}

/// Only successful, bounded, non-streaming, cookie-free responses are
/// cache-worthy.
fn should_store_response(response: &Response, max_body_bytes: usize) -> bool {
    if !response.status().is_success() {
        return false;
    }

    if response.headers().contains_key(header::SET_COOKIE) {
        return false;
    }

    if response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/event-stream"))
    {
        return false;
    }

    // Without a known upper bound the body could be unbounded; skip rather
    // than risk a buffering failure surfacing to the client.
    match response.body().size_hint().upper() {
        Some(length) => length as usize <= max_body_bytes,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn response_with(status: StatusCode, headers: &[(&'static str, &str)]) -> Response {
        let mut response = Response::new(Body::from("payload"));
        *response.status_mut() = status;
        for (name, value) in headers {
            response.headers_mut().append(
                header::HeaderName::from_static(name),
                HeaderValue::from_str(value).expect("header value"),
            );
        }
        response
    }

    const LIMIT: usize = 1024;

    #[test]
    fn stores_successful_sized_response() {
        let response = response_with(StatusCode::OK, &[("content-type", "application/json")]);
        assert!(should_store_response(&response, LIMIT));
    }

    #[test]
    fn skips_error_responses() {
        let response = response_with(StatusCode::NOT_FOUND, &[]);
        assert!(!should_store_response(&response, LIMIT));
    }

    #[test]
    fn skips_set_cookie_responses() {
        let response = response_with(StatusCode::OK, &[("set-cookie", "sid=abc")]);
        assert!(!should_store_response(&response, LIMIT));
    }

    #[test]
    fn skips_event_streams() {
        let response = response_with(StatusCode::OK, &[("content-type", "text/event-stream")]);
        assert!(!should_store_response(&response, LIMIT));
    }

    #[test]
    fn skips_bodies_past_the_buffer_limit() {
        let mut response = Response::new(Body::from(vec![0u8; 2048]));
        *response.status_mut() = StatusCode::OK;
        assert!(!should_store_response(&response, LIMIT));
    }
}
