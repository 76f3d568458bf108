//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Supporte les systèmes rencontrés dans les données éoliennes brésiliennes :
//! - SIRGAS 2000 / UTM 18S à 25S (EPSG:31978 à 31985)
//! - WGS 84 / UTM nord et sud (EPSG:32601 à 32660, 32701 à 32760)
//! - WGS 84 (EPSG:4326) et SIRGAS 2000 (EPSG:4674) géographiques
//! - Web Mercator (EPSG:3857)
//!
//! SIRGAS 2000 et WGS 84 sont considérés comme coïncidents (écart centimétrique),
//! comme le fait PROJ en l'absence de grille de transformation.

mod ellipsoid;
mod mercator;
#[cfg(feature = "reproject")]
mod proj_fallback;
mod smart;
mod utm;

pub use ellipsoid::{Ellipsoid, GRS80, WGS84};
#[cfg(feature = "reproject")]
pub use proj_fallback::Reprojector;
pub use smart::SmartReprojector;
pub use utm::UtmProjection;

use crate::crs::Crs;
use crate::error::{AerogeoError, Result};

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Repère de calcul associé à un code EPSG
#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Longitude/latitude en degrés
    Geographic,
    Utm(UtmProjection),
    WebMercator,
}

impl Frame {
    fn resolve(crs: Crs) -> Option<Self> {
        match crs.epsg() {
            4326 | 4674 => Some(Frame::Geographic),
            3857 => Some(Frame::WebMercator),
            code @ 31978..=31985 => Some(Frame::Utm(UtmProjection::new(code - 31960, true, GRS80))),
            code @ 32601..=32660 => Some(Frame::Utm(UtmProjection::new(code - 32600, false, WGS84))),
            code @ 32701..=32760 => Some(Frame::Utm(UtmProjection::new(code - 32700, true, WGS84))),
            _ => None,
        }
    }

    fn to_geographic(&self, x: f64, y: f64) -> Geographic {
        match self {
            Frame::Geographic => Geographic::from_degrees(x, y),
            Frame::Utm(utm) => utm.inverse(x, y),
            Frame::WebMercator => mercator::web_mercator_to_geographic(x, y),
        }
    }

    fn from_geographic(&self, geo: Geographic) -> (f64, f64) {
        match self {
            Frame::Geographic => geo.to_degrees(),
            Frame::Utm(utm) => utm.forward(geo),
            Frame::WebMercator => mercator::geographic_to_web_mercator(geo),
        }
    }
}

/// Reprojection légère entre deux systèmes supportés
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source: Frame,
    target: Frame,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source: Crs, target: Crs) -> Result<Self> {
        let source_frame = Frame::resolve(source).ok_or_else(|| {
            AerogeoError::unsupported(source, target, format!("{source} is not a supported source"))
        })?;
        let target_frame = Frame::resolve(target).ok_or_else(|| {
            AerogeoError::unsupported(source, target, format!("{target} is not a supported target"))
        })?;

        Ok(Self {
            source: source_frame,
            target: target_frame,
        })
    }

    /// Vérifie si le système est supporté
    pub fn is_supported_crs(crs: Crs) -> bool {
        Frame::resolve(crs).is_some()
    }

    /// Vérifie si la reprojection est supportée
    pub fn is_supported(source: Crs, target: Crs) -> bool {
        Self::is_supported_crs(source) && Self::is_supported_crs(target)
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        // Source -> géographique -> cible
        let geo = self.source.to_geographic(x, y);
        self.target.from_geographic(geo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sirgas_utm_to_wgs84() {
        let reproj = ReprojectorLite::new(Crs::from_epsg(31983), Crs::WGS84).unwrap();
        let (lon, lat) = reproj.transform_point(500000.0, 8000000.0);

        assert!((lon - (-45.0)).abs() < 1e-9, "lon={}", lon);
        assert!((lat - (-18.089)).abs() < 0.01, "lat={}", lat);
    }

    #[test]
    fn test_round_trip_through_zone() {
        let to_geo = ReprojectorLite::new(Crs::from_epsg(31984), Crs::WGS84).unwrap();
        let to_utm = ReprojectorLite::new(Crs::WGS84, Crs::from_epsg(31984)).unwrap();

        let (x, y) = (552560.0, 9587500.0);
        let (lon, lat) = to_geo.transform_point(x, y);
        let (x2, y2) = to_utm.transform_point(lon, lat);

        assert!((x - x2).abs() < 1e-4, "x={} -> {}", x, x2);
        assert!((y - y2).abs() < 1e-4, "y={} -> {}", y, y2);
    }

    #[test]
    fn test_geographic_datums_coincide() {
        let reproj = ReprojectorLite::new(Crs::WGS84, Crs::SIRGAS_2000).unwrap();
        let (lon, lat) = reproj.transform_point(-45.5, -10.25);
        assert!((lon - (-45.5)).abs() < 1e-12, "lon={}", lon);
        assert!((lat - (-10.25)).abs() < 1e-12, "lat={}", lat);
    }

    #[test]
    fn test_unsupported_epsg() {
        assert!(ReprojectorLite::new(Crs::from_epsg(2154), Crs::WGS84).is_err());
        assert!(ReprojectorLite::new(Crs::WGS84, Crs::from_epsg(5880)).is_err());
        assert!(!ReprojectorLite::is_supported(
            Crs::from_epsg(31977),
            Crs::WGS84
        ));
    }
}
