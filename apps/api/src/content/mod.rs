// Content acquisition: reader/direct fetch chain, HTML stripping, normalization.

pub mod fetcher;
pub mod html;
pub mod normalize;
pub mod sources;

use reqwest::Url;

use crate::content::fetcher::ContentFetcher;
use crate::content::normalize::normalize_text;
use crate::errors::AppError;

/// Where the article to rewrite comes from. Pasted text wins over a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
    Text(String),
    Url(String),
}

impl SourceContent {
    /// Picks the input mode from the two optional form fields.
    ///
    /// Blank fields count as absent. A URL must be absolute `http`/`https`.
    pub fn from_inputs(url: Option<&str>, text: Option<&str>) -> Result<Self, AppError> {
        let text = text.filter(|t| !t.trim().is_empty());
        let url = url.map(str::trim).filter(|u| !u.is_empty());

        match (text, url) {
            (Some(text), _) => Ok(SourceContent::Text(text.to_string())),
            (None, Some(url)) => {
                validate_url(url)?;
                Ok(SourceContent::Url(url.to_string()))
            }
            (None, None) => Err(AppError::Validation(
                "Provide either a source article URL or pasted text".to_string(),
            )),
        }
    }

    /// Resolves to bounded clean text. Only the URL variant touches the network.
    pub async fn resolve(&self, fetcher: &ContentFetcher) -> Result<String, AppError> {
        match self {
            SourceContent::Text(raw) => {
                let text = normalize_text(raw);
                if text.is_empty() {
                    return Err(AppError::Validation(
                        "Pasted text is empty after cleanup".to_string(),
                    ));
                }
                Ok(text)
            }
            SourceContent::Url(url) => fetcher.fetch_text(url).await,
        }
    }
}

fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url)
        .map_err(|e| AppError::Validation(format!("'{url}' is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::Validation(format!(
            "Unsupported URL scheme '{other}'; use http or https"
        ))),
    }
}
