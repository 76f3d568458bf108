//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible.

use geo::Point;

use super::ReprojectorLite;
use crate::crs::Crs;
use crate::error::Result;

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(super::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    /// Crée un nouveau reprojector
    pub fn new(source: Crs, target: Crs) -> Result<Self> {
        // Pas de reprojection nécessaire
        if source == target {
            return Ok(Self::Identity);
        }

        if ReprojectorLite::is_supported(source, target) {
            return Ok(Self::Lite(ReprojectorLite::new(source, target)?));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = super::Reprojector::new(source, target)?;
            return Ok(Self::Proj(proj));
        }

        #[cfg(not(feature = "reproject"))]
        Err(crate::error::AerogeoError::unsupported(
            source,
            target,
            "not handled by reproject_lite; build with --features reproject to use PROJ",
        ))
    }

    /// Transforme un point
    pub fn transform_point(&self, point: Point<f64>) -> Result<Point<f64>> {
        match self {
            Self::Identity => Ok(point),
            Self::Lite(lite) => {
                let (x, y) = lite.transform_point(point.x(), point.y());
                Ok(Point::new(x, y))
            }
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_point(point),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (pas de reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}
