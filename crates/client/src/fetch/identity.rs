//! Browser identity pool for session camouflage.

use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

/// A browser-like header set a session presents for its whole lifetime.
///
/// All strategies and modules share the session, so the identity never
/// varies between requests within one scraper instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserIdentity {
    /// User-Agent header value.
    pub user_agent: &'static str,
    /// Accept header value.
    pub accept: &'static str,
    /// Accept-Language header value.
    pub accept_language: &'static str,
}

const DESKTOP_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const MOBILE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Identities sampled at session construction, mirroring header sets of
/// current desktop and mobile browsers.
pub const IDENTITIES: &[BrowserIdentity] = &[
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        accept: DESKTOP_ACCEPT,
        accept_language: "en-GB,en;q=0.8",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        accept: DESKTOP_ACCEPT,
        accept_language: "en-GB,en;q=0.8",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1.2 Safari/605.1.15",
        accept: DESKTOP_ACCEPT,
        accept_language: "en-GB,en;q=0.8",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1",
        accept: MOBILE_ACCEPT,
        accept_language: "en-GB,en;q=0.5",
    },
];

impl BrowserIdentity {
    /// Pick one identity uniformly at random.
    pub fn pick() -> Self {
        let mut rng = rand::thread_rng();
        IDENTITIES[rng.gen_range(0..IDENTITIES.len())]
    }

    /// Default headers applied to every request of the session.
    ///
    /// Accept-Encoding is left to the client's compression features so
    /// response decoding stays automatic.
    pub fn header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(self.accept));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(self.accept_language),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("document"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("navigate"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("none"),
        );
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_draws_from_pool() {
        for _ in 0..16 {
            let identity = BrowserIdentity::pick();
            assert!(IDENTITIES.contains(&identity));
        }
    }

    #[test]
    fn test_header_map_contents() {
        let headers = IDENTITIES[0].header_map();
        assert_eq!(headers.get(header::ACCEPT).unwrap(), DESKTOP_ACCEPT);
        assert_eq!(headers.get(header::ACCEPT_LANGUAGE).unwrap(), "en-GB,en;q=0.8");
        assert_eq!(headers.get("upgrade-insecure-requests").unwrap(), "1");
        assert!(headers.get(header::ACCEPT_ENCODING).is_none());
    }
}
