//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible.

use super::ReprojectorLite;
use anyhow::Result;
use geo::MultiPolygon;

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::reproject::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if source_epsg == target_epsg {
            return Ok(Self::Identity);
        }

        if ReprojectorLite::is_supported(source_epsg, target_epsg) {
            let lite = ReprojectorLite::new(source_epsg, target_epsg)?;
            return Ok(Self::Lite(lite));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = crate::reproject::Reprojector::new(source_epsg, target_epsg)?;
            return Ok(Self::Proj(proj));
        }

        #[cfg(not(feature = "reproject"))]
        anyhow::bail!(
            "Reprojection EPSG:{} → EPSG:{} not supported.\n\
             Supported without PROJ: 4326 (WGS84), 25828-25838 (ETRS89 / UTM), 32601-32660 (WGS84 / UTM).\n\
             For other systems, build with: cargo build --features reproject",
            source_epsg,
            target_epsg
        )
    }

    /// Transforme un multipolygone
    pub fn transform_multi_polygon(&self, mp: &MultiPolygon) -> Result<MultiPolygon> {
        match self {
            Self::Identity => Ok(mp.clone()),
            Self::Lite(lite) => lite.transform_multi_polygon(mp),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_multi_polygon(mp),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (no reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}
