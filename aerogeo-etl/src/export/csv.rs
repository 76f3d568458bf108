//! Export de la table de sortie en CSV (sans géométrie ni colonne d'index)

use std::path::Path;

use aerogeo::OutputTable;
use anyhow::{Context, Result};
use tracing::info;

/// Écrit la table en CSV, en créant les répertoires parents.
/// Les valeurs manquantes donnent une cellule vide.
pub fn export_to_csv(table: &OutputTable, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;

    write_table(&mut writer, table)?;
    writer.flush()?;

    info!(rows = table.len(), path = %output_path.display(), "CSV écrit");
    Ok(())
}

fn write_table<W: std::io::Write>(writer: &mut csv::Writer<W>, table: &OutputTable) -> Result<()> {
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    Ok(())
}
