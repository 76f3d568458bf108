//! Enchaînement des trois étapes
//!
//! enregistrements bruts -> géocodage -> filtre qualité -> frontière -> table

use std::time::Instant;

use tracing::info;

use crate::containment::{filter_within, BoundaryOutcome, BoundarySource};
use crate::crs::Crs;
use crate::error::Result;
use crate::geocode::geocode;
use crate::output::OutputTable;
use crate::quality::{QualityFilter, DEFAULT_MAX_POWER_MW};
use crate::report::{metrics, PipelineReport};
use crate::types::{GeoDataset, Record};
use crate::zone::ZoneTable;

/// Paramètres d'un traitement
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Table fuseau -> CRS projeté
    pub zones: ZoneTable,
    /// CRS géographique des colonnes latitude/longitude
    pub target_crs: Crs,
    /// Seuil de puissance (inclus)
    pub max_power_mw: f64,
    pub boundary: BoundarySource,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            zones: ZoneTable::SIRGAS_2000_UTM_SOUTH,
            target_crs: Crs::WGS84,
            max_power_mw: DEFAULT_MAX_POWER_MW,
            boundary: BoundarySource::Disabled,
        }
    }
}

impl PipelineOptions {
    pub fn with_boundary(mut self, boundary: BoundarySource) -> Self {
        self.boundary = boundary;
        self
    }
}

/// Résultat d'un traitement
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: OutputTable,
    /// Jeu de données final, géométries dans le CRS de la frontière
    pub dataset: GeoDataset,
    pub report: PipelineReport,
    pub boundary: BoundaryOutcome,
}

/// Traite un lot complet d'enregistrements.
///
/// # Errors
///
/// Seules les erreurs de l'étape de géocodage sont fatales
/// (`MissingColumns`, `NoGeocodedData`).
pub fn process(records: Vec<Record>, options: &PipelineOptions) -> Result<PipelineOutput> {
    let start = Instant::now();
    let mut report = PipelineReport::new();
    report.add(metrics::INPUT_RECORDS, records.len());
    info!(records = records.len(), "Traitement du lot");

    let dataset = geocode(records, &options.zones, options.target_crs, &mut report)?;
    let dataset = QualityFilter::new(options.max_power_mw).apply(dataset, &mut report);
    let (dataset, boundary) = filter_within(dataset, &options.boundary, &mut report);

    let table = OutputTable::from_dataset(&dataset);
    report.add(metrics::OUTPUT_RECORDS, table.len());
    report.set_duration(start.elapsed());

    info!(
        output = table.len(),
        removed = report.total_removed(),
        status = ?report.status,
        "Batch processed"
    );

    Ok(PipelineOutput {
        table,
        dataset,
        report,
        boundary,
    })
}
