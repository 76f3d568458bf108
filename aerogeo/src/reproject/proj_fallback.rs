//! Reprojection de points avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

use geo::Point;
use ::proj::Proj;

use crate::crs::Crs;
use crate::error::{AerogeoError, Result};

/// Reprojection entre deux systèmes de coordonnées quelconques
pub struct Reprojector {
    proj: Proj,
    source: Crs,
    target: Crs,
}

impl Reprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    pub fn new(source: Crs, target: Crs) -> Result<Self> {
        let proj = Proj::new_known_crs(&source.to_string(), &target.to_string(), None)
            .map_err(|e| AerogeoError::unsupported(source, target, e.to_string()))?;

        Ok(Self {
            proj,
            source,
            target,
        })
    }

    pub fn source(&self) -> Crs {
        self.source
    }

    pub fn target(&self) -> Crs {
        self.target
    }

    /// Transforme un point
    pub fn transform_point(&self, point: Point<f64>) -> Result<Point<f64>> {
        let (x, y) = self
            .proj
            .convert((point.x(), point.y()))
            .map_err(|e| AerogeoError::Transform(e.to_string()))?;
        Ok(Point::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sirgas_utm_to_wgs84() {
        let reprojector = Reprojector::new(Crs::from_epsg(31983), Crs::WGS84).unwrap();
        let p = reprojector
            .transform_point(Point::new(500000.0, 8000000.0))
            .unwrap();

        assert!((p.x() - (-45.0)).abs() < 1e-6, "lon={}", p.x());
        assert!(p.y() < -18.0 && p.y() > -18.2, "lat={}", p.y());
    }

    #[test]
    fn test_invalid_epsg() {
        assert!(Reprojector::new(Crs::from_epsg(99999), Crs::WGS84).is_err());
    }
}
