use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{endpoint, JsonClient};
use crate::error::HttpError;
use crate::settings::Settings;

const SENTENCE_BREAK: &str = ". ";

/// One glossary entry as written to the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionRecord {
    #[serde(rename = "palabra")]
    pub term: String,
    #[serde(rename = "significado")]
    pub meaning: String,
    #[serde(rename = "fuente")]
    pub source_url: Option<String>,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<PageUrls>,
}

#[derive(Deserialize)]
struct PageUrls {
    #[serde(default)]
    page: Option<String>,
}

pub fn summary_url(settings: &Settings, title: &str) -> Result<Url, HttpError> {
    endpoint(&settings.base_url, &["api", "rest_v1", "page", "summary", title])
}

/// Fetch the page summary for `title` and condense it to one sentence.
///
/// `Ok(None)` when the endpoint answers non-2xx or the extract is blank.
/// Transport and decode failures are returned so the caller can decide.
pub fn fetch_summary<C: JsonClient + ?Sized>(
    client: &C,
    settings: &Settings,
    title: &str,
) -> Result<Option<DefinitionRecord>, HttpError> {
    let url = summary_url(settings, title)?;
    let body = match client.get_json(&url) {
        Ok(body) => body,
        Err(HttpError::Status { status, .. }) => {
            debug!("{}: summary returned HTTP {}", title, status);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let parsed: SummaryResponse =
        serde_json::from_value(body).map_err(|source| HttpError::Decode {
            url: url.to_string(),
            source,
        })?;

    let Some(meaning) = parsed.extract.as_deref().and_then(first_sentence) else {
        debug!("{}: empty extract", title);
        return Ok(None);
    };

    let source_url = parsed
        .content_urls
        .and_then(|c| c.desktop)
        .and_then(|d| d.page);

    Ok(Some(DefinitionRecord {
        term: title.to_string(),
        meaning,
        source_url,
    }))
}

/// Everything before the first `". "`, with trailing periods collapsed to one.
/// `None` for blank input.
pub fn first_sentence(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let head = text
        .split_once(SENTENCE_BREAK)
        .map_or(text, |(head, _)| head)
        .trim()
        .trim_end_matches('.');
    Some(format!("{}.", head))
}

// ── Tests ──
