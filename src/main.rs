mod categories;
mod client;
mod error;
mod harvest;
mod output;
mod settings;
mod summary;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;

use crate::client::WikiClient;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "tech_glossary",
    about = "Build a Spanish technology glossary from Wikipedia category summaries"
)]
struct Cli {
    /// Definitions to collect (default: 100)
    #[arg(short = 'n', long)]
    target: Option<usize>,
    /// Output JSON file (default: tecnologia_diccionario.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Pause between summary requests in milliseconds (default: 200)
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Log and continue when a category listing fails instead of aborting
    #[arg(long)]
    skip_failed_categories: bool,
}

impl Cli {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(n) = self.target {
            settings.target = n;
        }
        if let Some(path) = self.output {
            settings.output_path = path;
        }
        if let Some(ms) = self.delay_ms {
            settings.delay = Duration::from_millis(ms);
        }
        if self.skip_failed_categories {
            settings.skip_failed_categories = true;
        }
        settings
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = cli.apply(Settings::load()?);
    info!(
        categories = settings.categories.len(),
        target = settings.target,
        output = ?settings.output_path,
        "Starting glossary harvest"
    );

    let client = WikiClient::new(&settings)?;
    let report = harvest::harvest(&client, &settings, &mut rand::thread_rng())?;
    output::write_records(&settings.output_path, &report.records)?;

    info!(
        candidates = report.candidates,
        attempted = report.attempted,
        errors = report.skipped_errors,
        "Finished in {:.1}s",
        t0.elapsed().as_secs_f64()
    );
    println!(
        "✅ Guardadas {} definiciones en {}",
        report.records.len(),
        settings.output_path.display()
    );
    Ok(())
}

// ── Tests ──
