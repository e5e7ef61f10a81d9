use std::thread;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::categories;
use crate::client::JsonClient;
use crate::settings::Settings;
use crate::summary::{self, DefinitionRecord};

/// Counters and records from one run.
pub struct HarvestReport {
    pub candidates: usize,
    pub attempted: usize,
    pub skipped_errors: usize,
    pub records: Vec<DefinitionRecord>,
}

/// Titles from every configured category, in category order.
/// Titles listed under several categories appear once per category.
pub fn gather_candidates<C: JsonClient + ?Sized>(
    client: &C,
    settings: &Settings,
) -> Result<Vec<String>> {
    let mut titles = Vec::new();
    for category in &settings.categories {
        match categories::list_members(client, settings, category) {
            Ok(members) => titles.extend(members),
            Err(e) if settings.skip_failed_categories => {
                warn!("Skipping category {}: {}", category, e);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to list {}", category));
            }
        }
    }
    Ok(titles)
}

/// Gather candidates, shuffle them and collect summaries until `target`
/// definitions exist or candidates run out.
pub fn harvest<C, R>(client: &C, settings: &Settings, rng: &mut R) -> Result<HarvestReport>
where
    C: JsonClient + ?Sized,
    R: Rng + ?Sized,
{
    let mut candidates = gather_candidates(client, settings)?;
    info!("Collected {} candidate titles", candidates.len());
    candidates.shuffle(rng);

    let pb = ProgressBar::new(settings.target as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut records = Vec::new();
    let mut attempted = 0usize;
    let mut skipped_errors = 0usize;

    for title in &candidates {
        if records.len() >= settings.target {
            break;
        }
        attempted += 1;

        match summary::fetch_summary(client, settings, title) {
            Ok(Some(record)) => {
                records.push(record);
                pb.inc(1);
            }
            Ok(None) => debug!("No definition for {}", title),
            Err(e) => {
                skipped_errors += 1;
                warn!("Skipping {}: {}", title, e);
            }
        }

        if !settings.delay.is_zero() {
            thread::sleep(settings.delay);
        }
    }

    pb.finish_and_clear();
    info!(
        "Kept {} definitions from {} attempts ({} errors, {} candidates)",
        records.len(),
        attempted,
        skipped_errors,
        candidates.len()
    );

    Ok(HarvestReport {
        candidates: candidates.len(),
        attempted,
        skipped_errors,
        records,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};

    use super::*;
    use crate::categories::members_url;
    use crate::client::fake::FakeClient;
    use crate::summary::summary_url;

    const REDES: &str = "Categoría:Redes_informáticas";
    const DATOS: &str = "Categoría:Bases_de_datos";

    fn settings(target: usize) -> Settings {
        Settings {
            categories: vec![REDES.to_string(), DATOS.to_string()],
            target,
            delay: Duration::ZERO,
            ..Settings::default()
        }
    }

    fn listing(titles: &[&str]) -> Value {
        let members: Vec<Value> = titles
            .iter()
            .map(|t| json!({ "ns": 0, "title": t }))
            .collect();
        json!({ "query": { "categorymembers": members } })
    }

    fn extract(title: &str) -> Value {
        json!({
            "extract": format!("{} es un término. Tiene más detalles.", title),
            "content_urls": { "desktop": { "page": format!("https://es.wikipedia.org/wiki/{}", title) } }
        })
    }

    fn with_summaries(mut client: FakeClient, s: &Settings, titles: &[&str]) -> FakeClient {
        for t in titles {
            client = client.json(summary_url(s, t).unwrap(), extract(t));
        }
        client
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn stops_at_target() {
        let s = settings(4);
        let redes = ["Router", "Switch", "Ethernet"];
        let datos = ["SQL", "Índice", "Transacción"];
        let client = FakeClient::new()
            .json(members_url(&s, REDES).unwrap(), listing(&redes))
            .json(members_url(&s, DATOS).unwrap(), listing(&datos));
        let client = with_summaries(client, &s, &redes);
        let client = with_summaries(client, &s, &datos);

        let report = harvest(&client, &s, &mut rng()).unwrap();
        assert_eq!(report.candidates, 6);
        assert_eq!(report.records.len(), 4);
        assert_eq!(report.attempted, 4);
        // 2 listings + exactly 4 summaries
        assert_eq!(client.calls().len(), 6);
    }

    #[test]
    fn exhausts_candidates_and_skips_failures() {
        let s = settings(100);
        let client = FakeClient::new()
            .json(members_url(&s, REDES).unwrap(), listing(&["Router", "Borrado", "Vacío"]))
            .json(members_url(&s, DATOS).unwrap(), listing(&["SQL", "Roto"]))
            .status(summary_url(&s, "Borrado").unwrap(), 404)
            .json(summary_url(&s, "Vacío").unwrap(), json!({ "extract": "" }))
            .garbage(summary_url(&s, "Roto").unwrap());
        let client = with_summaries(client, &s, &["Router", "SQL"]);

        let report = harvest(&client, &s, &mut rng()).unwrap();
        assert_eq!(report.candidates, 5);
        assert_eq!(report.attempted, 5);
        assert_eq!(report.skipped_errors, 1);

        let terms: HashSet<&str> = report.records.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, HashSet::from(["Router", "SQL"]));
        for r in &report.records {
            assert_eq!(r.meaning, format!("{} es un término.", r.term));
        }
    }

    #[test]
    fn duplicates_across_categories_are_kept() {
        let s = settings(100);
        let client = FakeClient::new()
            .json(members_url(&s, REDES).unwrap(), listing(&["Protocolo"]))
            .json(members_url(&s, DATOS).unwrap(), listing(&["Protocolo"]));
        let client = with_summaries(client, &s, &["Protocolo"]);

        let candidates = gather_candidates(&client, &s).unwrap();
        assert_eq!(candidates, vec!["Protocolo", "Protocolo"]);

        let report = harvest(&client, &s, &mut rng()).unwrap();
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn shuffle_preserves_candidate_pool() {
        let s = settings(100);
        let redes: Vec<String> = (0..20).map(|i| format!("Red {}", i)).collect();
        let redes_ref: Vec<&str> = redes.iter().map(String::as_str).collect();
        let client = FakeClient::new()
            .json(members_url(&s, REDES).unwrap(), listing(&redes_ref))
            .json(members_url(&s, DATOS).unwrap(), listing(&[]));
        let client = with_summaries(client, &s, &redes_ref);

        let report = harvest(&client, &s, &mut rng()).unwrap();
        let mut got: Vec<&str> = report.records.iter().map(|r| r.term.as_str()).collect();
        assert_ne!(got, redes_ref, "seeded shuffle should reorder 20 titles");
        got.sort_unstable();
        let mut want = redes_ref.clone();
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn zero_target_fetches_no_summaries() {
        let s = settings(0);
        let client = FakeClient::new()
            .json(members_url(&s, REDES).unwrap(), listing(&["Router"]))
            .json(members_url(&s, DATOS).unwrap(), listing(&[]));
        let report = harvest(&client, &s, &mut rng()).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.attempted, 0);
    }

    #[test]
    fn category_failure_aborts_by_default() {
        let s = settings(100);
        let client = FakeClient::new()
            .json(members_url(&s, REDES).unwrap(), listing(&["Router"]))
            .status(members_url(&s, DATOS).unwrap(), 500);
        let err = harvest(&client, &s, &mut rng()).err().unwrap();
        assert!(format!("{:#}", err).contains(DATOS));
    }

    #[test]
    fn category_failure_skipped_when_configured() {
        let s = Settings {
            skip_failed_categories: true,
            ..settings(100)
        };
        let client = FakeClient::new()
            .json(members_url(&s, REDES).unwrap(), listing(&["Router"]))
            .status(members_url(&s, DATOS).unwrap(), 500);
        let client = with_summaries(client, &s, &["Router"]);

        let report = harvest(&client, &s, &mut rng()).unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.records.len(), 1);
    }
}
