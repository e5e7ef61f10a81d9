use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::summary::DefinitionRecord;

/// Write records as a pretty-printed JSON array. Non-ASCII text is kept
/// literal (serde_json never escapes it).
pub fn write_records(path: &Path, records: &[DefinitionRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("Failed to serialize records to {:?}", path))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

// ── Tests ──
