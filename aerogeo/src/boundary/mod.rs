//! Frontière de référence (polygones du pays)
//!
//! Chargée depuis un Shapefile (CRS lu dans le .prj voisin) ou un GeoJSON
//! (membre `crs` historique, WGS 84 par défaut). Les polygones sont indexés
//! dans un R-tree par leur emprise ; le test de contenance exact n'est fait
//! que sur les candidats.

mod prj;

pub use prj::detect_crs;

use std::path::Path;

use geo::{BoundingRect, Contains, Geometry, Point, Polygon};
use geojson::GeoJson;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info};

use crate::crs::Crs;
use crate::error::{AerogeoError, Result};

/// Polygone de la frontière stocké dans le R-tree
struct BoundaryEntry {
    /// Indice de la feature d'origine
    feature: usize,
    envelope: AABB<[f64; 2]>,
    polygon: Polygon<f64>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Frontière de référence, en lecture seule une fois chargée
pub struct ReferenceBoundary {
    crs: Crs,
    feature_count: usize,
    index: RTree<BoundaryEntry>,
}

impl std::fmt::Debug for ReferenceBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceBoundary")
            .field("crs", &self.crs)
            .field("features", &self.feature_count)
            .field("polygons", &self.index.size())
            .finish()
    }
}

impl ReferenceBoundary {
    /// Construit la frontière depuis des géométries (une par feature).
    /// Seuls les polygones et multipolygones sont retenus.
    pub fn from_geometries(crs: Crs, geometries: Vec<Geometry<f64>>) -> Result<Self> {
        let feature_count = geometries.len();
        let mut entries = Vec::new();

        for (feature, geometry) in geometries.into_iter().enumerate() {
            for polygon in polygons_of(geometry) {
                let Some(rect) = polygon.bounding_rect() else {
                    continue;
                };
                entries.push(BoundaryEntry {
                    feature,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    polygon,
                });
            }
        }

        if entries.is_empty() {
            return Err(AerogeoError::InvalidBoundary {
                path: Default::default(),
                reason: "no polygon in boundary dataset".to_string(),
            });
        }

        Ok(Self {
            crs,
            feature_count,
            index: RTree::bulk_load(entries),
        })
    }

    /// Charge la frontière depuis un fichier `.shp`, `.geojson` ou `.json`
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let boundary = match extension.as_deref() {
            Some("shp") => load_shapefile(path),
            Some("geojson" | "json") => load_geojson(path),
            _ => Err(AerogeoError::UnsupportedFormat(path.to_path_buf())),
        }
        .map_err(|e| match e {
            AerogeoError::InvalidBoundary { reason, .. } => {
                AerogeoError::invalid_boundary(path, reason)
            }
            other => other,
        })?;

        info!(
            path = %path.display(),
            crs = %boundary.crs,
            features = boundary.feature_count,
            polygons = boundary.index.size(),
            "Boundary loaded"
        );
        Ok(boundary)
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Nombre de features d'origine
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Nombre de polygones indexés
    pub fn polygon_count(&self) -> usize {
        self.index.size()
    }

    /// Features dont un polygone contient strictement le point
    /// (un point sur le contour n'est pas contenu)
    pub fn features_containing(&self, point: &Point<f64>) -> Vec<usize> {
        let query = AABB::from_point([point.x(), point.y()]);
        let mut features: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&query)
            .filter(|entry| entry.polygon.contains(point))
            .map(|entry| entry.feature)
            .collect();
        features.sort_unstable();
        features.dedup();
        features
    }
}

/// Polygones d'une géométrie (les autres types sont ignorés)
fn polygons_of(geometry: Geometry<f64>) -> Vec<Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0,
        Geometry::GeometryCollection(gc) => gc.0.into_iter().flat_map(polygons_of).collect(),
        _ => {
            debug!("Géométrie non polygonale ignorée");
            Vec::new()
        }
    }
}

/// Shapefile : géométries du .shp, CRS du .prj voisin (WGS 84 sans .prj)
fn load_shapefile(path: &Path) -> Result<ReferenceBoundary> {
    std::fs::metadata(path).map_err(|e| AerogeoError::io(path, e))?;

    let shapes =
        shapefile::read_shapes(path).map_err(|e| AerogeoError::invalid_boundary(path, e))?;

    let geometries = shapes
        .into_iter()
        .map(|shape| {
            Geometry::<f64>::try_from(shape).map_err(|e| AerogeoError::invalid_boundary(path, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let prj_path = path.with_extension("prj");
    let crs = match std::fs::read(&prj_path) {
        Ok(data) => detect_crs(&data)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %prj_path.display(), "Pas de fichier .prj, EPSG:4326 par défaut");
            Crs::WGS84
        }
        Err(e) => return Err(AerogeoError::io(prj_path, e)),
    };

    ReferenceBoundary::from_geometries(crs, geometries)
}

/// GeoJSON : CRS du membre `crs` (RFC 7946 : WGS 84 par défaut)
fn load_geojson(path: &Path) -> Result<ReferenceBoundary> {
    let data = std::fs::read(path).map_err(|e| AerogeoError::io(path, e))?;
    let text = simdutf8::basic::from_utf8(&data)
        .map_err(|_| AerogeoError::invalid_boundary(path, "not valid UTF-8"))?;

    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| AerogeoError::invalid_boundary(path, e))?;

    let crs = match declared_crs(&geojson) {
        Some(name) => Crs::parse(name).ok_or_else(|| AerogeoError::UnknownCrs(name.to_string()))?,
        None => Crs::WGS84,
    };

    let geometries = match &geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(|g| Geometry::<f64>::try_from(g.clone()))
            .collect::<std::result::Result<Vec<_>, _>>(),
        GeoJson::Feature(f) => f
            .geometry
            .iter()
            .map(|g| Geometry::<f64>::try_from(g.clone()))
            .collect(),
        GeoJson::Geometry(g) => Geometry::<f64>::try_from(g.clone()).map(|g| vec![g]),
    }
    .map_err(|e| AerogeoError::invalid_boundary(path, e))?;

    ReferenceBoundary::from_geometries(crs, geometries)
}

/// Nom du CRS déclaré par le membre historique `crs.properties.name`
fn declared_crs(geojson: &GeoJson) -> Option<&str> {
    let members = match geojson {
        GeoJson::FeatureCollection(fc) => fc.foreign_members.as_ref(),
        GeoJson::Feature(f) => f.foreign_members.as_ref(),
        GeoJson::Geometry(g) => g.foreign_members.as_ref(),
    }?;
    members.get("crs")?.get("properties")?.get("name")?.as_str()
}
