//! Systèmes de référence de coordonnées identifiés par code EPSG

use std::fmt;

use serde::Serialize;

/// Système de référence (code EPSG)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Crs(u32);

impl Crs {
    /// WGS 84 géographique
    pub const WGS84: Crs = Crs(4326);

    /// SIRGAS 2000 géographique (référentiel officiel brésilien)
    pub const SIRGAS_2000: Crs = Crs(4674);

    /// Web Mercator
    pub const WEB_MERCATOR: Crs = Crs(3857);

    pub const fn from_epsg(epsg: u32) -> Self {
        Self(epsg)
    }

    pub const fn epsg(self) -> u32 {
        self.0
    }

    /// Vrai pour les systèmes exprimés en longitude/latitude
    pub fn is_geographic(self) -> bool {
        matches!(self.0, 4326 | 4674)
    }

    /// Parse "EPSG:4674", "urn:ogc:def:crs:EPSG::4674" ou "CRS84"
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.ends_with("CRS84") {
            return Some(Self::WGS84);
        }
        let code = name.rsplit(':').next()?;
        code.parse().ok().map(Self)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}
