//! Étape 3 : filtrage par la frontière de référence
//!
//! Jointure spatiale interne sur le prédicat « strictement à l'intérieur ».
//! Le jeu de données est reprojeté dans le CRS de la frontière, jamais
//! l'inverse. Si la frontière est indisponible, les données sont rendues
//! non filtrées et le résultat l'indique.

use std::path::PathBuf;
use std::sync::Arc;

use geo::Point;
use tracing::{info, warn};

use crate::boundary::ReferenceBoundary;
use crate::crs::Crs;
use crate::error::Result;
use crate::reproject::SmartReprojector;
use crate::report::{metrics, PipelineReport};
use crate::types::GeoDataset;

/// Origine de la frontière de référence
#[derive(Debug, Clone)]
pub enum BoundarySource {
    /// Fichier chargé à chaque traitement
    File(PathBuf),
    /// Frontière déjà chargée, partagée en lecture seule
    Preloaded(Arc<ReferenceBoundary>),
    /// Pas de filtrage géographique
    Disabled,
}

/// Résultat du filtrage géographique
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryOutcome {
    /// Filtrage appliqué dans le CRS de la frontière
    Filtered { boundary_crs: Crs, removed: usize },
    /// Filtrage sauté, données rendues telles quelles
    Unfiltered { reason: String },
}

impl BoundaryOutcome {
    pub fn is_filtered(&self) -> bool {
        matches!(self, BoundaryOutcome::Filtered { .. })
    }
}

/// Ne garde que les points strictement à l'intérieur de la frontière.
///
/// Ne retourne jamais d'erreur : une frontière illisible ou une
/// reprojection impossible dégradent le traitement au lieu de l'arrêter.
pub fn filter_within(
    dataset: GeoDataset,
    source: &BoundarySource,
    report: &mut PipelineReport,
) -> (GeoDataset, BoundaryOutcome) {
    let boundary = match source {
        BoundarySource::File(path) => match ReferenceBoundary::load(path) {
            Ok(boundary) => Arc::new(boundary),
            Err(e) => {
                let reason = format!("failed to read boundary {}: {}", path.display(), e);
                warn!(error = %e, "Filtrage géographique ignoré");
                report.mark_degraded(reason.clone());
                return (dataset, BoundaryOutcome::Unfiltered { reason });
            }
        },
        BoundarySource::Preloaded(boundary) => Arc::clone(boundary),
        BoundarySource::Disabled => {
            let reason = "boundary filtering disabled".to_string();
            info!("{}", reason);
            report.record_warning(reason.clone());
            return (dataset, BoundaryOutcome::Unfiltered { reason });
        }
    };

    let dataset = match reconcile_crs(dataset, boundary.crs()) {
        Ok(dataset) => dataset,
        Err((dataset, e)) => {
            let reason = format!("cannot reproject to boundary CRS: {}", e);
            warn!(error = %e, "Filtrage géographique ignoré");
            report.mark_degraded(reason.clone());
            return (dataset, BoundaryOutcome::Unfiltered { reason });
        }
    };

    let mut dataset = dataset;
    let before = dataset.len();
    let mut multi_matches = 0;
    dataset.records.retain(|r| {
        let matches = boundary.features_containing(&r.geometry).len();
        if matches > 1 {
            multi_matches += 1;
        }
        matches > 0
    });
    let removed = before - dataset.len();

    report.add(metrics::REMOVED_OUTSIDE_BOUNDARY, removed);
    if multi_matches > 0 {
        warn!(records = multi_matches, "Points contenus dans plusieurs entités de la frontière");
        report.add(metrics::MULTI_BOUNDARY_MATCHES, multi_matches);
    }
    info!(removed, remaining = dataset.len(), "Filtrage par frontière terminé");

    (
        dataset,
        BoundaryOutcome::Filtered {
            boundary_crs: boundary.crs(),
            removed,
        },
    )
}

/// Reprojette les géométries dans `target`. En cas d'échec, le jeu de
/// données est rendu intact avec l'erreur.
fn reconcile_crs(
    mut dataset: GeoDataset,
    target: Crs,
) -> std::result::Result<GeoDataset, (GeoDataset, crate::AerogeoError)> {
    if dataset.crs == target {
        return Ok(dataset);
    }

    info!(from = %dataset.crs, to = %target, "Reprojection des aérogénérateurs vers le CRS de la frontière");

    let reprojected: Result<Vec<Point<f64>>> = SmartReprojector::new(dataset.crs, target)
        .and_then(|reprojector| {
            dataset
                .records
                .iter()
                .map(|r| reprojector.transform_point(r.geometry))
                .collect()
        });

    match reprojected {
        Ok(points) => {
            for (record, point) in dataset.records.iter_mut().zip(points) {
                record.geometry = point;
            }
            dataset.crs = target;
            Ok(dataset)
        }
        Err(e) => Err((dataset, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeoRecord, Record};
    use geo::{polygon, Geometry};

    fn boundary(crs: Crs) -> Arc<ReferenceBoundary> {
        let poly = polygon![
            (x: -50.0, y: -25.0),
            (x: -40.0, y: -25.0),
            (x: -40.0, y: -10.0),
            (x: -50.0, y: -10.0),
            (x: -50.0, y: -25.0),
        ];
        Arc::new(ReferenceBoundary::from_geometries(crs, vec![Geometry::Polygon(poly)]).unwrap())
    }

    fn point(lon: f64, lat: f64) -> GeoRecord {
        GeoRecord {
            attributes: Record::new().with("POT_MW", 2.0),
            latitude: lat,
            longitude: lon,
            geometry: Point::new(lon, lat),
        }
    }

    #[test]
    fn test_strictly_within() {
        let dataset = GeoDataset::new(
            Crs::WGS84,
            vec![
                point(-45.0, -18.0),
                point(-40.0, -18.0),
                point(-40.001, -18.0),
                point(-30.0, -5.0),
            ],
        );
        let mut report = PipelineReport::new();
        let (out, outcome) = filter_within(
            dataset,
            &BoundarySource::Preloaded(boundary(Crs::WGS84)),
            &mut report,
        );

        assert_eq!(out.len(), 2);
        assert_eq!(
            outcome,
            BoundaryOutcome::Filtered {
                boundary_crs: Crs::WGS84,
                removed: 2
            }
        );
        assert_eq!(report.get(metrics::REMOVED_OUTSIDE_BOUNDARY), 2);
    }

    #[test]
    fn test_dataset_reprojected_to_boundary_crs() {
        let dataset = GeoDataset::new(Crs::WGS84, vec![point(-45.0, -18.0)]);
        let (out, outcome) = filter_within(
            dataset,
            &BoundarySource::Preloaded(boundary(Crs::SIRGAS_2000)),
            &mut PipelineReport::new(),
        );

        assert!(outcome.is_filtered());
        assert_eq!(out.crs, Crs::SIRGAS_2000);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records[0].longitude, -45.0);
    }

    #[test]
    fn test_projected_boundary() {
        // Frontière en UTM 23S autour du méridien central
        let poly = polygon![
            (x: 400000.0, y: 7900000.0),
            (x: 600000.0, y: 7900000.0),
            (x: 600000.0, y: 8100000.0),
            (x: 400000.0, y: 8100000.0),
            (x: 400000.0, y: 7900000.0),
        ];
        let utm = Arc::new(
            ReferenceBoundary::from_geometries(Crs::from_epsg(31983), vec![Geometry::Polygon(poly)])
                .unwrap(),
        );
        let dataset = GeoDataset::new(
            Crs::WGS84,
            vec![point(-45.0, -18.09), point(-44.0, -10.0)],
        );
        let (out, _) = filter_within(dataset, &BoundarySource::Preloaded(utm), &mut PipelineReport::new());

        assert_eq!(out.len(), 1);
        assert!((out.records[0].geometry.x() - 500000.0).abs() < 1e-3);
    }

    #[test]
    fn test_unreadable_boundary_degrades() {
        let dataset = GeoDataset::new(Crs::WGS84, vec![point(-45.0, -18.0), point(0.0, 0.0)]);
        let mut report = PipelineReport::new();
        let (out, outcome) = filter_within(
            dataset,
            &BoundarySource::File(PathBuf::from("/nonexistent/brasil.shp")),
            &mut report,
        );

        assert_eq!(out.len(), 2);
        assert!(matches!(outcome, BoundaryOutcome::Unfiltered { .. }));
        assert_eq!(report.status, crate::report::PipelineStatus::Degraded);
        assert_eq!(report.get(metrics::REMOVED_OUTSIDE_BOUNDARY), 0);
    }

    #[cfg(not(feature = "reproject"))]
    #[test]
    fn test_unsupported_boundary_crs_degrades() {
        let dataset = GeoDataset::new(Crs::WGS84, vec![point(-45.0, -18.0)]);
        let mut report = PipelineReport::new();
        let (out, outcome) = filter_within(
            dataset,
            &BoundarySource::Preloaded(boundary(Crs::from_epsg(5880))),
            &mut report,
        );

        assert_eq!(out.crs, Crs::WGS84);
        assert_eq!(out.len(), 1);
        assert!(!outcome.is_filtered());
        assert_eq!(report.status, crate::report::PipelineStatus::Degraded);
    }

    #[test]
    fn test_disabled() {
        let dataset = GeoDataset::new(Crs::WGS84, vec![point(0.0, 0.0)]);
        let mut report = PipelineReport::new();
        let (out, outcome) = filter_within(dataset, &BoundarySource::Disabled, &mut report);

        assert_eq!(out.len(), 1);
        assert!(!outcome.is_filtered());
        assert_eq!(report.status, crate::report::PipelineStatus::Complete);
    }
}
