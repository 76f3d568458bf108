//! # aerogeo
//!
//! Normalisation des coordonnées d'aérogénérateurs et validation géographique.
//!
//! ## Étapes
//!
//! 1. Résolution des fuseaux UTM (`FUSO_AG`) et projection vers EPSG:4326
//! 2. Filtrage qualité (coordonnées non finies, puissance aberrante)
//! 3. Filtrage par une frontière de référence (Shapefile ou GeoJSON)
//!
//! Le traitement est synchrone et mono-thread. Une frontière illisible ne fait
//! pas échouer le lot : le résultat est rendu non filtré et signalé comme tel.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aerogeo::{process, BoundarySource, PipelineOptions, Record};
//!
//! let records = vec![
//!     Record::new()
//!         .with("X", 500000.0)
//!         .with("Y", 8000000.0)
//!         .with("FUSO_AG", "UTM 23")
//!         .with("POT_MW", 2.1),
//! ];
//! let options = PipelineOptions::default()
//!     .with_boundary(BoundarySource::File("data/BR_Pais.shp".into()));
//!
//! let output = process(records, &options)?;
//! println!("{}", output.report.summary());
//! ```

pub mod boundary;
pub mod containment;
pub mod crs;
pub mod error;
pub mod geocode;
pub mod output;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod reproject;
pub mod types;
pub mod zone;

pub use boundary::ReferenceBoundary;
pub use containment::{filter_within, BoundaryOutcome, BoundarySource};
pub use crs::Crs;
pub use error::{AerogeoError, Result};
pub use geocode::geocode;
pub use output::OutputTable;
pub use pipeline::{process, PipelineOptions, PipelineOutput};
pub use quality::{QualityFilter, DEFAULT_MAX_POWER_MW};
pub use report::{PipelineReport, PipelineStatus};
pub use types::{GeoDataset, GeoRecord, Record, Value};
pub use zone::{UtmZone, ZoneTable};
