//! Modules d'export (CSV, GeoJSON)

pub mod csv;
pub mod geojson;

pub use self::csv::export_to_csv;
pub use self::geojson::export_to_geojson;
