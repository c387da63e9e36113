//! Chart file encoders and the cached-chart reader.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use medley_core::chart::Chart;
use medley_core::convert::ChartDocument;

/// Read a cached chart (generic-schema JSON).
pub fn read_chart(path: &Path) -> Result<Chart> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chart {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse chart {}", path.display()))
}

/// Write the merged chart as gzipped level data.
pub fn write_level_data(path: &Path, chart: &Chart) -> Result<()> {
    let json = serde_json::to_vec(chart).context("Failed to serialize level data")?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .context("Failed to compress level data")?;
    let compressed = encoder.finish().context("Failed to finish compression")?;

    fs::write(path, compressed).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write an editor-schema chart document.
pub fn write_editor_chart(path: &Path, document: &ChartDocument) -> Result<()> {
    let json = serde_json::to_string(document).context("Failed to serialize editor chart")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
