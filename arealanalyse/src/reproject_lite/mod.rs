//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Systèmes supportés :
//! - WGS84 géographique (EPSG:4326), ordre longitude/latitude
//! - ETRS89 / UTM zones 28N à 38N (EPSG:25828 à 25838), ellipsoïde GRS80
//! - WGS84 / UTM zones 1N à 60N (EPSG:32601 à 32660)
//!
//! ETRS89 et WGS84 sont confondus (écart submétrique, négligeable pour des
//! surfaces).

mod ellipsoid;
mod smart;
mod utm;

pub use ellipsoid::Ellipsoid;
pub use smart::SmartReprojector;

use anyhow::{bail, Result};
use geo::{Coord, MapCoords, MultiPolygon};

/// Écart maximal en longitude au méridien central d'une zone UTM (degrés)
///
/// Au-delà, la série diverge puis se replie sur elle-même.
const MAX_ZONE_OFFSET_DEG: f64 = 30.0;

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

/// Système de coordonnées pris en charge par [`ReprojectorLite`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crs {
    /// Longitude/latitude en degrés
    Geographic,
    /// UTM hémisphère nord
    Utm { zone: u8, ellipsoid: Ellipsoid },
}

impl Crs {
    pub fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            4326 => Some(Self::Geographic),
            25828..=25838 => Some(Self::Utm {
                zone: (epsg - 25800) as u8,
                ellipsoid: Ellipsoid::GRS80,
            }),
            32601..=32660 => Some(Self::Utm {
                zone: (epsg - 32600) as u8,
                ellipsoid: Ellipsoid::WGS84,
            }),
            _ => None,
        }
    }
}

/// Vérifie qu'un couple lon/lat est une coordonnée géographique valide
pub fn validate_geographic(lon: f64, lat: f64) -> Result<()> {
    if !lon.is_finite() || !lat.is_finite() {
        bail!("Invalid coordinate ({}, {}): not a finite number", lon, lat);
    }
    if !(-90.0..=90.0).contains(&lat) {
        bail!("Invalid latitude {}: must be within [-90, 90]", lat);
    }
    if !(-180.0..=180.0).contains(&lon) {
        bail!("Invalid longitude {}: must be within [-180, 180]", lon);
    }
    Ok(())
}

/// Reprojection légère entre EPSG:4326 et les zones UTM nord
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source_epsg: u32,
    target_epsg: u32,
    source: Crs,
    target: Crs,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let Some(source) = Crs::from_epsg(source_epsg) else {
            bail!(
                "EPSG:{} not supported. Supported: 4326, 25828-25838, 32601-32660",
                source_epsg
            );
        };
        let Some(target) = Crs::from_epsg(target_epsg) else {
            bail!(
                "EPSG:{} not supported. Supported: 4326, 25828-25838, 32601-32660",
                target_epsg
            );
        };

        Ok(Self {
            source_epsg,
            target_epsg,
            source,
            target,
        })
    }

    /// Vérifie si l'EPSG est supporté
    pub fn is_supported_epsg(epsg: u32) -> bool {
        Crs::from_epsg(epsg).is_some()
    }

    /// Vérifie si la reprojection est supportée
    pub fn is_supported(source: u32, target: u32) -> bool {
        Self::is_supported_epsg(source) && Self::is_supported_epsg(target)
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let geo = self.source_to_geographic(x, y)?;
        let (tx, ty) = self.geographic_to_target(geo)?;

        if !tx.is_finite() || !ty.is_finite() {
            bail!(
                "Projection of ({}, {}) from EPSG:{} to EPSG:{} is not finite",
                x,
                y,
                self.source_epsg,
                self.target_epsg
            );
        }
        Ok((tx, ty))
    }

    fn source_to_geographic(&self, x: f64, y: f64) -> Result<Geographic> {
        match self.source {
            Crs::Geographic => {
                validate_geographic(x, y)?;
                Ok(Geographic::from_degrees(x, y))
            }
            Crs::Utm { zone, ellipsoid } => {
                if !x.is_finite() || !y.is_finite() {
                    bail!("Invalid coordinate ({}, {}): not a finite number", x, y);
                }
                Ok(utm::utm_to_geographic(x, y, zone, &ellipsoid))
            }
        }
    }

    fn geographic_to_target(&self, geo: Geographic) -> Result<(f64, f64)> {
        match self.target {
            Crs::Geographic => Ok(geo.to_degrees()),
            Crs::Utm { zone, ellipsoid } => {
                let offset = (geo.lon - utm::central_meridian(zone)).to_degrees();
                let offset = (offset + 180.0).rem_euclid(360.0) - 180.0;
                if offset.abs() > MAX_ZONE_OFFSET_DEG {
                    bail!(
                        "Longitude {:.6} is outside the domain of UTM zone {} (more than {}° from its central meridian)",
                        geo.lon.to_degrees(),
                        zone,
                        MAX_ZONE_OFFSET_DEG
                    );
                }
                Ok(utm::geographic_to_utm(geo, zone, &ellipsoid))
            }
        }
    }

    /// Transforme un multipolygone
    pub fn transform_multi_polygon(&self, mp: &MultiPolygon) -> Result<MultiPolygon> {
        mp.try_map_coords(|c| self.transform_coord(c))
    }

    fn transform_coord(&self, c: Coord) -> Result<Coord> {
        let (x, y) = self.transform_point(c.x, c.y)?;
        Ok(Coord { x, y })
    }
}
