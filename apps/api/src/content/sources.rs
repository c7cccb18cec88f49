//! Page sources: the two strategies the fetcher chains together.
//!
//! `ReaderSource` asks a reader proxy to render the page and hand back article
//! text; `DirectSource` downloads the raw HTML itself. Both sit behind the
//! `PageSource` trait so the fallback chain can be driven by fakes in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::content::html::extract_visible_text;
use crate::content::normalize::normalize_text;

pub const READER_TIMEOUT: Duration = Duration::from_secs(15);
pub const DIRECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sent on direct fetches; many sites refuse requests without a browser-like agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} contained no readable text")]
    NoReadableText { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// Already-extracted article text (reader proxy output).
    PlainText,
    Html,
}

/// A successfully downloaded body, before normalization.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub format: BodyFormat,
}

impl FetchedPage {
    pub fn plain_text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: BodyFormat::PlainText,
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: BodyFormat::Html,
        }
    }

    /// Runs the body through HTML stripping (if needed) and the normalizer.
    pub fn into_clean_text(self) -> String {
        match self.format {
            BodyFormat::PlainText => normalize_text(&self.body),
            BodyFormat::Html => normalize_text(&extract_visible_text(&self.body)),
        }
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short label used in logs and combined error messages.
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Reader proxy
// ────────────────────────────────────────────────────────────────────────────

/// Fetches through a reader proxy: `GET <base>/<target-url>`.
pub struct ReaderSource {
    client: Client,
    base_url: String,
}

impl ReaderSource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(READER_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn proxied_url(&self, target: &str) -> String {
        format!("{}/{}", self.base_url, target)
    }
}

#[async_trait]
impl PageSource for ReaderSource {
    fn name(&self) -> &'static str {
        "reader"
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let proxied = self.proxied_url(url);
        debug!("Reader fetch: {proxied}");
        let body = get_body(&self.client, &proxied, url, READER_TIMEOUT).await?;
        Ok(FetchedPage::plain_text(body))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Direct HTML fetch
// ────────────────────────────────────────────────────────────────────────────

/// Downloads the target page itself with a browser user agent.
pub struct DirectSource {
    client: Client,
}

impl DirectSource {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(DIRECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for DirectSource {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!("Direct fetch: {url}");
        let body = get_body(&self.client, url, url, DIRECT_TIMEOUT).await?;
        Ok(FetchedPage::html(body))
    }
}

/// GETs `request_url` and returns the body of a 2xx response.
/// Errors are reported against `target_url`, the page the user asked for.
async fn get_body(
    client: &Client,
    request_url: &str,
    target_url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    let classify = |err: reqwest::Error| {
        if err.is_timeout() {
            FetchError::Timeout {
                url: target_url.to_string(),
                secs: timeout.as_secs(),
            }
        } else {
            FetchError::Transport {
                url: target_url.to_string(),
                message: err.to_string(),
            }
        }
    };

    let response = client.get(request_url).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: target_url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(classify)
}
