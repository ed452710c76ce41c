//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`. Il couvre
//! les systèmes que `reproject_lite` ne connaît pas.

use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use proj::Proj;

/// Reprojection de géométries entre deux systèmes de coordonnées
///
/// Le handle PROJ n'est pas partageable entre threads : les conversions sont
/// sérialisées par un mutex.
pub struct Reprojector {
    proj: Mutex<Proj>,
}

impl Reprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&source, &target, None).context(format!(
            "Failed to create projection from {} to {}",
            source, target
        ))?;

        Ok(Self {
            proj: Mutex::new(proj),
        })
    }

    /// Transforme un multipolygone
    pub fn transform_multi_polygon(&self, mp: &MultiPolygon) -> Result<MultiPolygon> {
        let polys: Result<Vec<Polygon>> = mp.0.iter().map(|p| self.transform_polygon(p)).collect();
        Ok(MultiPolygon::new(polys?))
    }

    /// Transforme une LineString (conversion batch)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString> {
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        {
            let proj = self
                .proj
                .lock()
                .map_err(|_| anyhow!("PROJ handle poisoned"))?;
            proj.convert_array(&mut coords)
                .context("Batch coordinate transformation failed")?;
        }

        if let Some((x, y)) = coords.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
            bail!("Projection produced a non-finite coordinate ({}, {})", x, y);
        }

        let result: Vec<Coord> = coords.into_iter().map(|(x, y)| Coord { x, y }).collect();
        Ok(LineString::new(result))
    }

    fn transform_polygon(&self, p: &Polygon) -> Result<Polygon> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors: Result<Vec<LineString>> = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect();
        Ok(Polygon::new(exterior, interiors?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_wgs84_to_utm33() {
        let reprojector = Reprojector::new(4326, 25833).unwrap();
        let hamar = MultiPolygon::new(vec![polygon![
            (x: 11.1003, y: 60.7889),
            (x: 11.1020, y: 60.7889),
            (x: 11.1020, y: 60.7902),
            (x: 11.1003, y: 60.7902),
        ]]);

        let result = reprojector.transform_multi_polygon(&hamar).unwrap();
        let first = result.0[0].exterior().0[0];
        assert!((first.x - 287769.07).abs() < 0.1, "x={}", first.x);
        assert!((first.y - 6745582.04).abs() < 0.1, "y={}", first.y);
    }

    #[test]
    fn test_invalid_epsg() {
        assert!(Reprojector::new(99999, 4326).is_err());
    }
}
