use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::client::{endpoint, JsonClient};
use crate::error::HttpError;
use crate::settings::Settings;

/// Main (article) namespace id in MediaWiki.
const MAIN_NAMESPACE: i64 = 0;

#[derive(Deserialize)]
struct MembersResponse {
    query: MembersQuery,
}

#[derive(Deserialize)]
struct MembersQuery {
    categorymembers: Vec<Member>,
}

#[derive(Deserialize)]
struct Member {
    title: String,
    ns: i64,
}

pub fn members_url(settings: &Settings, category: &str) -> Result<Url, HttpError> {
    let mut url = endpoint(&settings.base_url, &["w", "api.php"])?;
    url.query_pairs_mut()
        .append_pair("action", "query")
        .append_pair("list", "categorymembers")
        .append_pair("cmtitle", category)
        .append_pair("cmlimit", &settings.member_limit.to_string())
        .append_pair("cmtype", "page")
        .append_pair("format", "json");
    Ok(url)
}

/// List article titles in `category`, dropping anything outside the main
/// namespace or with a namespace prefix in its title.
pub fn list_members<C: JsonClient + ?Sized>(
    client: &C,
    settings: &Settings,
    category: &str,
) -> Result<Vec<String>, HttpError> {
    let url = members_url(settings, category)?;
    let body = client.get_json(&url)?;
    let parsed: MembersResponse =
        serde_json::from_value(body).map_err(|e| HttpError::Shape {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

    let total = parsed.query.categorymembers.len();
    let titles: Vec<String> = parsed
        .query
        .categorymembers
        .into_iter()
        .filter(|m| is_article(m.ns, &m.title))
        .map(|m| m.title)
        .collect();

    info!("{}: {} articles ({} members listed)", category, titles.len(), total);
    Ok(titles)
}

fn is_article(ns: i64, title: &str) -> bool {
    ns == MAIN_NAMESPACE && !title.contains(':')
}

// ── Tests ──
