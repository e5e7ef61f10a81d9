use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::error::HttpError;
use crate::settings::Settings;

/// Fetch a URL and hand back its JSON body. Non-2xx responses are errors.
pub trait JsonClient {
    fn get_json(&self, url: &Url) -> Result<Value, HttpError>;
}

/// Blocking reqwest client carrying the tool's identifying headers.
pub struct WikiClient {
    http: Client,
}

impl WikiClient {
    pub fn new(settings: &Settings) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        let lang = HeaderValue::from_str(&settings.accept_language)
            .map_err(|_| HttpError::Header(settings.accept_language.clone()))?;
        headers.insert(ACCEPT_LANGUAGE, lang);

        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(HttpError::Client)?;
        Ok(WikiClient { http })
    }
}

impl JsonClient for WikiClient {
    fn get_json(&self, url: &Url) -> Result<Value, HttpError> {
        let transport = |source: reqwest::Error| HttpError::Transport {
            url: url.to_string(),
            source,
        };

        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(transport)?;
        serde_json::from_str(&body).map_err(|source| HttpError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, HttpError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| HttpError::BaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}


// ── Tests ──
