//! Acquisition des enregistrements bruts (service ArcGIS ou instantané JSON)

pub mod arcgis;

pub use arcgis::ArcGisSource;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use aerogeo::Record;
use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};
use tracing::info;

/// Sauvegarde les enregistrements bruts en tableau JSON
pub fn save_snapshot(records: &[Record], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }

    let file =
        File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records).context("Failed to write snapshot")?;
    writer.flush()?;

    info!(records = records.len(), path = %path.display(), "Instantané enregistré");
    Ok(())
}

/// Recharge un instantané produit par [`save_snapshot`]
pub fn load_snapshot(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).context(format!("Failed to open snapshot: {}", path.display()))?;
    let objects: Vec<Map<String, JsonValue>> = serde_json::from_reader(BufReader::new(file))
        .context(format!("Snapshot is not an array of objects: {}", path.display()))?;

    let records: Vec<Record> = objects.iter().map(Record::from_json_object).collect();
    info!(records = records.len(), path = %path.display(), "Instantané chargé");
    Ok(records)
}
