//! HTTP cache control module
//!
//! Provides `ETag` generation and conditional request handling for static files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cache-Control value sent with every static file
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Generate `ETag` using fast hashing
///
/// Same bytes always give the same tag within one build, so repeated reads of
/// an unchanged file produce identical responses.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag, a comma separated list, and the `*` wildcard.
/// Weak validators (`W/"..."`) compare by their opaque part.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}
