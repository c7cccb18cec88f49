//! Content Fetcher: resolves a URL to clean text.
//!
//! Flow: reader proxy (optional) → direct HTML fetch → normalize.
//! The reader renders client-side pages and gets past most consent walls, but it
//! is a third-party service that can be slow or rate-limited, so any reader
//! failure falls through to the direct fetch instead of failing the request.

use tracing::{info, warn};

use crate::content::sources::{DirectSource, FetchError, PageSource, ReaderSource};
use crate::errors::AppError;

pub const DEFAULT_READER_BASE_URL: &str = "https://r.jina.ai";

pub struct ContentFetcher {
    reader: Option<Box<dyn PageSource>>,
    direct: Box<dyn PageSource>,
}

impl ContentFetcher {
    /// Builds the production fetcher. `use_reader_mode = false` skips the proxy.
    pub fn new(reader_base_url: &str, use_reader_mode: bool) -> anyhow::Result<Self> {
        let reader: Option<Box<dyn PageSource>> = if use_reader_mode {
            Some(Box::new(ReaderSource::new(reader_base_url)?))
        } else {
            None
        };
        Ok(Self::with_sources(reader, Box::new(DirectSource::new()?)))
    }

    pub fn with_sources(
        reader: Option<Box<dyn PageSource>>,
        direct: Box<dyn PageSource>,
    ) -> Self {
        Self { reader, direct }
    }

    pub fn reader_enabled(&self) -> bool {
        self.reader.is_some()
    }

    /// Returns normalized text for `url`, or `AppError::Fetch` carrying the
    /// cause of every strategy that was tried. Never returns partial text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, AppError> {
        let mut failures: Vec<(&'static str, FetchError)> = Vec::new();

        if let Some(reader) = &self.reader {
            match fetch_clean(reader.as_ref(), url).await {
                Ok(text) => {
                    info!(
                        "Fetched {} chars from {url} via reader",
                        text.chars().count()
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Reader fetch failed for {url}, falling back to direct fetch: {e}");
                    failures.push((reader.name(), e));
                }
            }
        }

        match fetch_clean(self.direct.as_ref(), url).await {
            Ok(text) => {
                info!(
                    "Fetched {} chars from {url} via direct fetch",
                    text.chars().count()
                );
                Ok(text)
            }
            Err(e) => {
                warn!("Direct fetch failed for {url}: {e}");
                failures.push((self.direct.name(), e));
                Err(AppError::Fetch {
                    url: url.to_string(),
                    message: describe_failures(&failures),
                })
            }
        }
    }
}

async fn fetch_clean(source: &dyn PageSource, url: &str) -> Result<String, FetchError> {
    let text = source.fetch(url).await?.into_clean_text();
    if text.is_empty() {
        return Err(FetchError::NoReadableText {
            url: url.to_string(),
        });
    }
    Ok(text)
}

fn describe_failures(failures: &[(&'static str, FetchError)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
