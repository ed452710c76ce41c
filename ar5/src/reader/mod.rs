//! Lecture des couches AR5 exportées en GeoJSON
//!
//! Deux formes sont acceptées :
//! - FeatureCollection (`.geojson`, `.json`)
//! - GeoJSON délimité par lignes (`.geojsonl`, `.geojsons`, `.ndjson`)

pub mod collection;
pub mod crs;
pub mod seq;

use std::path::Path;

use geo::{Geometry, MultiPolygon, Polygon};
use geojson::feature::Id;
use geojson::JsonObject;
use serde_json::Value;
use tracing::trace;

use crate::types::{Feature, Layer, LoadOptions, DEFAULT_CODE};
use crate::Ar5Error;

/// Forme d'une couche sur disque
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// FeatureCollection unique
    Collection,
    /// Une feature par ligne (RFC 8142 toléré)
    Sequence,
}

impl LayerKind {
    /// Détermine la forme d'après l'extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "geojson" | "json" => Some(Self::Collection),
            "geojsonl" | "geojsons" | "ndjson" => Some(Self::Sequence),
            _ => None,
        }
    }
}

/// Parse le contenu brut d'une couche
pub fn parse_layer(
    name: &str,
    kind: LayerKind,
    data: &[u8],
    options: &LoadOptions,
) -> Result<Layer, Ar5Error> {
    let text = simdutf8::basic::from_utf8(data).map_err(|_| Ar5Error::InvalidUtf8(name.into()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    match kind {
        LayerKind::Collection => collection::parse(name, text, options),
        LayerKind::Sequence => seq::parse(name, text, options),
    }
}

/// Accumule les features d'une couche en comptant les enregistrements ignorés
pub(crate) struct LayerBuilder<'a> {
    name: &'a str,
    options: &'a LoadOptions,
    features: Vec<Feature>,
    skipped: usize,
    position: usize,
}

impl<'a> LayerBuilder<'a> {
    pub(crate) fn new(name: &'a str, options: &'a LoadOptions) -> Self {
        Self {
            name,
            options,
            features: Vec::new(),
            skipped: 0,
            position: 0,
        }
    }

    pub(crate) fn push(&mut self, feature: geojson::Feature) {
        let position = self.position;
        self.position += 1;

        match convert_feature(feature, position, self.name, &self.options.code_field) {
            Some(feature) => self.features.push(feature),
            None => {
                trace!(layer = self.name, position, "Skipping non-areal record");
                self.skipped += 1;
            }
        }
    }

    pub(crate) fn finish(self, epsg: u32) -> Layer {
        Layer {
            name: self.name.to_string(),
            projection: crate::Projection::new(epsg),
            features: self.features,
            skipped: self.skipped,
        }
    }
}

/// Convertit une feature GeoJSON, `None` si elle n'a pas de surface
fn convert_feature(
    feature: geojson::Feature,
    position: usize,
    layer: &str,
    code_field: &str,
) -> Option<Feature> {
    let geometry = Geometry::<f64>::try_from(feature.geometry?).ok()?;
    let geometry = areal_geometry(geometry)?;

    let id = match feature.id {
        Some(Id::String(s)) => s,
        Some(Id::Number(n)) => n.to_string(),
        None => format!("{}:{}", layer, position),
    };

    Some(Feature {
        id,
        geometry,
        code: code_value(feature.properties.as_ref(), code_field),
        layer: layer.to_string(),
    })
}

/// Normalise une géométrie surfacique en MultiPolygon
pub fn areal_geometry(geometry: Geometry) -> Option<MultiPolygon> {
    let mut polygons: Vec<Polygon> = Vec::new();
    collect_polygons(geometry, &mut polygons);

    // Un anneau extérieur fermé compte au moins 4 positions
    polygons.retain(|p| p.exterior().0.len() >= 4);

    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon::new(polygons))
    }
}

fn collect_polygons(geometry: Geometry, out: &mut Vec<Polygon>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p),
        Geometry::MultiPolygon(mp) => out.extend(mp.0),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in gc.0 {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

/// Lit le code AR5 d'une feature
///
/// Les nombres entiers sont rendus sans décimale (`81`, pas `81.0`).
pub fn code_value(properties: Option<&JsonObject>, field: &str) -> String {
    match properties.and_then(|p| p.get(field)) {
        None | Some(Value::Null) => DEFAULT_CODE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, GeometryCollection, LineString};
    use serde_json::json;

    fn props(value: Value) -> JsonObject {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_code_value() {
        assert_eq!(code_value(Some(&props(json!({"artype": "81"}))), "artype"), "81");
        assert_eq!(code_value(Some(&props(json!({"artype": 30}))), "artype"), "30");
        assert_eq!(code_value(Some(&props(json!({"artype": 30.0}))), "artype"), "30");
        assert_eq!(code_value(Some(&props(json!({"artype": 30.5}))), "artype"), "30.5");
        assert_eq!(code_value(Some(&props(json!({"artype": null}))), "artype"), "U");
        assert_eq!(code_value(Some(&props(json!({"other": "F"}))), "artype"), "U");
        assert_eq!(code_value(None, "artype"), "U");
    }

    #[test]
    fn test_areal_geometry_filters_non_polygons() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        assert!(areal_geometry(line).is_none());
        assert!(areal_geometry(Geometry::Point(point!(x: 1.0, y: 2.0))).is_none());
    }

    #[test]
    fn test_areal_geometry_flattens_collection() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let gc = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Polygon(square.clone()),
            Geometry::Point(point!(x: 5.0, y: 5.0)),
            Geometry::Polygon(square),
        ]));

        let mp = areal_geometry(gc).unwrap();
        assert_eq!(mp.0.len(), 2);
    }

    #[test]
    fn test_layer_kind_from_path() {
        assert_eq!(
            LayerKind::from_path(Path::new("ar5_flate.geojson")),
            Some(LayerKind::Collection)
        );
        assert_eq!(
            LayerKind::from_path(Path::new("ar5.GEOJSONL")),
            Some(LayerKind::Sequence)
        );
        assert_eq!(LayerKind::from_path(Path::new("a00000009.gdbtable")), None);
    }
}
