//! Cache key derivation from product URLs.

/// Derive the cache key for a product URL.
///
/// The key is the path portion after the last `/products/` segment; URLs
/// without that segment key on the full URL. Derivation is a pure function
/// of the URL so entries stay addressable across runs.
pub fn product_key(product_url: &str) -> &str {
    match product_url.rsplit_once("/products/") {
        Some((_, id)) => id,
        None => product_url,
    }
}
