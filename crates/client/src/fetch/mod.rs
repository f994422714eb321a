//! Storefront HTTP session with anti-detection camouflage.
//!
//! ### Session identity
//! - One persistent connection-reuse client per scraper instance
//! - Browser-like default headers picked at random at construction and
//!   fixed for the session's lifetime
//!
//! ### Response vetting
//! - 403 becomes a blocked error; other non-2xx statuses a status error
//! - Bodies below a minimum size count as soft blocks
//! - Known block-page markers near the top of the body are rejected

pub mod identity;
pub mod pacing;

use std::time::Instant;

use reqwest::{Client, StatusCode};
use url::Url;

pub use identity::BrowserIdentity;
pub use pacing::Pacing;

use trolley_core::{AppConfig, Error};

/// Markers that betray an anti-bot interstitial rather than a product page.
const BLOCK_MARKERS: &[&str] = &["access denied", "forbidden", "blocked", "cloudflare", "captcha"];

/// How much of the body head is scanned for block markers. Interstitials
/// announce themselves in the title; full product pages must not be
/// rejected for marker words buried in copy further down.
const BLOCK_SCAN_BYTES: usize = 2048;

/// Page retrieval seam between the pipeline and the live session.
///
/// The pipeline only needs "URL in, vetted body out", so tests can swap in
/// scripted fetchers without a network.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page and return its vetted body.
    async fn fetch_page(&self, url: &str) -> Result<String, Error>;
}

/// HTTP session for storefront pages.
pub struct SessionClient {
    http: Client,
    identity: BrowserIdentity,
    min_body_bytes: usize,
}

impl SessionClient {
    /// Build a session with a randomly chosen browser identity.
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        Self::with_identity(config, BrowserIdentity::pick())
    }

    /// Build a session presenting a fixed identity.
    pub fn with_identity(config: &AppConfig, identity: BrowserIdentity) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(identity.user_agent)
            .default_headers(identity.header_map())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(5))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, identity, min_body_bytes: config.min_body_bytes })
    }

    /// Fetch a page body, vetting status and content for block signals.
    pub async fn fetch(&self, url_str: &str) -> Result<String, Error> {
        let start = Instant::now();
        let url = Url::parse(url_str).map_err(|e| Error::InvalidUrl(format!("{url_str}: {e}")))?;

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_transport(&url, &e))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(Error::Blocked(format!("403 forbidden for {url}")));
        }
        if !status.is_success() {
            return Err(Error::Status { status: status.as_u16(), url: url.to_string() });
        }

        let body = response.text().await.map_err(|e| classify_transport(&url, &e))?;
        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!("fetched {} in {}ms ({} bytes)", url, fetch_ms, body.len());

        vet_body(&url, &body, self.min_body_bytes)?;
        Ok(body)
    }

    /// Identity this session presents.
    pub fn identity(&self) -> &BrowserIdentity {
        &self.identity
    }
}

#[async_trait::async_trait]
impl PageFetcher for SessionClient {
    async fn fetch_page(&self, url: &str) -> Result<String, Error> {
        self.fetch(url).await
    }
}

fn classify_transport(url: &Url, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(url.to_string())
    } else {
        Error::Http(format!("{url}: {err}"))
    }
}

/// Reject bodies that look like anti-bot responses instead of real pages.
fn vet_body(url: &Url, body: &str, min_len: usize) -> Result<(), Error> {
    if body.len() < min_len {
        return Err(Error::Blocked(format!(
            "{} byte body for {url} looks like a soft block",
            body.len()
        )));
    }
    let scan = body.len().min(BLOCK_SCAN_BYTES);
    let head = String::from_utf8_lossy(&body.as_bytes()[..scan]).to_lowercase();
    for marker in BLOCK_MARKERS {
        if head.contains(marker) {
            return Err(Error::Blocked(format!("block marker \"{marker}\" in body for {url}")));
        }
    }
    Ok(())
}
