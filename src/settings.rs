use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, ConfigError, Environment};
use reqwest::Url;
use serde::de::DeserializeOwned;

pub const ENV_PREFIX: &str = "GLOSARIO";

const BASE_URL: &str = "https://es.wikipedia.org";
const USER_AGENT: &str = "ProyectoEducativo/1.0 (contacto: tu_email@dominio.com)";
const ACCEPT_LANGUAGE: &str = "es";
const OUTPUT_PATH: &str = "tecnologia_diccionario.json";
const TARGET: usize = 100;
const MEMBER_LIMIT: usize = 200;
const DELAY_MS: u64 = 200;
const TIMEOUT_SECS: u64 = 20;

const CATEGORIES: [&str; 8] = [
    "Categoría:Tecnología_de_la_información",
    "Categoría:Informática",
    "Categoría:Telecomunicaciones",
    "Categoría:Inteligencia_artificial",
    "Categoría:Ciberseguridad",
    "Categoría:Ingeniería_de_software",
    "Categoría:Redes_informáticas",
    "Categoría:Bases_de_datos",
];

/// Everything a harvest run needs. Defaults reproduce the fixed batch job;
/// env and CLI only ever override individual fields.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub user_agent: String,
    pub accept_language: String,
    pub categories: Vec<String>,
    /// Stop once this many definitions have been collected.
    pub target: usize,
    /// `cmlimit` sent with each category listing.
    pub member_limit: usize,
    /// Pause after every summary attempt, successful or not.
    pub delay: Duration,
    pub timeout: Duration,
    pub output_path: PathBuf,
    /// Log and continue instead of aborting when a category listing fails.
    pub skip_failed_categories: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: Url::parse(BASE_URL).expect("BASE_URL constant is a valid URL"),
            user_agent: USER_AGENT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
            categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
            target: TARGET,
            member_limit: MEMBER_LIMIT,
            delay: Duration::from_millis(DELAY_MS),
            timeout: Duration::from_secs(TIMEOUT_SECS),
            output_path: PathBuf::from(OUTPUT_PATH),
            skip_failed_categories: false,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `GLOSARIO_*` environment variables.
    pub fn load() -> Result<Self> {
        Settings::default().overlay(Environment::with_prefix(ENV_PREFIX))
    }

    fn overlay(mut self, env: Environment) -> Result<Self> {
        let layered = Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read environment settings")?;

        if let Some(raw) = lookup::<String>(&layered, "base_url")? {
            self.base_url = parse_base_url(&raw)?;
        }
        if let Some(ua) = lookup::<String>(&layered, "user_agent")? {
            self.user_agent = ua;
        }
        if let Some(lang) = lookup::<String>(&layered, "accept_language")? {
            self.accept_language = lang;
        }
        if let Some(raw) = lookup::<String>(&layered, "categories")? {
            let categories = split_categories(&raw);
            if categories.is_empty() {
                bail!("{}_CATEGORIES is set but lists no categories", ENV_PREFIX);
            }
            self.categories = categories;
        }
        if let Some(n) = lookup::<usize>(&layered, "target")? {
            self.target = n;
        }
        if let Some(n) = lookup::<usize>(&layered, "member_limit")? {
            self.member_limit = n;
        }
        if let Some(ms) = lookup::<u64>(&layered, "delay_ms")? {
            self.delay = Duration::from_millis(ms);
        }
        if let Some(secs) = lookup::<u64>(&layered, "timeout_secs")? {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup::<String>(&layered, "output")? {
            self.output_path = PathBuf::from(path);
        }
        if let Some(skip) = lookup::<bool>(&layered, "skip_failed_categories")? {
            self.skip_failed_categories = skip;
        }
        Ok(self)
    }
}

fn lookup<T: DeserializeOwned>(layered: &Config, key: &str) -> Result<Option<T>> {
    match layered.get::<T>(key) {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e).with_context(|| {
            format!("Invalid value for {}_{}", ENV_PREFIX, key.to_uppercase())
        }),
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid base URL {:?}", raw))?;
    if url.cannot_be_a_base() {
        bail!("Base URL {:?} cannot carry a path", raw);
    }
    Ok(url)
}

fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tests ──
