//! Service d'analyse : reprojection du polygone puis agrégation AR5
//!
//! Partagé par le serveur HTTP et la commande `analyze`. Le jeu, la table de
//! codes et le reprojector sont en lecture seule après construction.

use std::sync::Arc;

use anyhow::{Context, Result};
use ar5::{AreaSummary, CodeTable, Dataset, Overlap, Projection};
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Geometry, Line, LineString, MultiPolygon};
use geozero::wkt::WktWriter;
use geozero::GeozeroGeometry;
use serde_json::Value;
use tracing::{debug, info, Level};

use crate::config::Config;
use crate::error::AnalysisError;
use crate::reproject_lite::SmartReprojector;

/// Projection des polygones reçus (longitude/latitude)
pub const INPUT_EPSG: u32 = 4326;

/// Projection métrique de calcul (ETRS89 / UTM 33N)
pub const ANALYSIS_EPSG: u32 = 25833;

/// Analyseur prêt à servir
pub struct Analyzer {
    dataset: Arc<Dataset>,
    codes: Arc<CodeTable>,
    reprojector: SmartReprojector,
    code_field: String,
    source_epsg: u32,
}

impl Analyzer {
    /// Prépare l'analyse ; un jeu hors EPSG:25833 est reprojeté une fois ici
    pub fn new(dataset: Dataset, codes: CodeTable, code_field: &str) -> Result<Self> {
        let source_epsg = dataset.projection().epsg;

        let dataset = if source_epsg == ANALYSIS_EPSG {
            dataset
        } else {
            let reprojector = SmartReprojector::new(source_epsg, ANALYSIS_EPSG)?;
            info!(
                from = source_epsg,
                to = ANALYSIS_EPSG,
                backend = reprojector.description(),
                "Reprojecting dataset"
            );
            dataset
                .try_map_geometries(Projection::new(ANALYSIS_EPSG), |mp| {
                    reprojector.transform_multi_polygon(mp)
                })
                .context("Failed to reproject dataset")?
        };

        let reprojector = SmartReprojector::new(INPUT_EPSG, ANALYSIS_EPSG)?;
        debug!(backend = reprojector.description(), "Input reprojector ready");

        Ok(Self {
            dataset: Arc::new(dataset),
            codes: Arc::new(codes),
            reprojector,
            code_field: code_field.to_string(),
            source_epsg,
        })
    }

    /// Charge le jeu et la table de codes configurés
    ///
    /// Toute erreur ici est fatale pour le service.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dataset = ar5::load(&config.dataset_path, &config.load_options()).with_context(|| {
            format!("Failed to load AR5 dataset from {}", config.dataset_path.display())
        })?;
        let codes = config.code_table()?;
        info!(codes = %config.codes, entries = codes.len(), "Code table loaded");

        Self::new(dataset, codes, &config.code_field)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    pub fn code_field(&self) -> &str {
        &self.code_field
    }

    /// Projection des couches sur disque, avant reprojection
    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Analyse la valeur `polygon` d'une requête (géométrie ou Feature GeoJSON)
    pub fn analyze_geojson(&self, polygon: &Value) -> Result<AreaSummary, AnalysisError> {
        let zone = parse_polygon(polygon)?;
        self.analyze(&zone)
    }

    /// Analyse un polygone en EPSG:4326
    pub fn analyze(&self, zone: &MultiPolygon) -> Result<AreaSummary, AnalysisError> {
        let projected = self.project(zone)?;
        Ok(self.aggregate(&projected))
    }

    /// Reprojette un polygone EPSG:4326 vers EPSG:25833
    pub fn project(&self, zone: &MultiPolygon) -> Result<MultiPolygon, AnalysisError> {
        let projected = self
            .reprojector
            .transform_multi_polygon(zone)
            .map_err(|e| AnalysisError::Projection(e.to_string()))?;

        if tracing::enabled!(Level::DEBUG) {
            debug!(
                wkt = %to_wkt(&Geometry::MultiPolygon(projected.clone())),
                area = projected.unsigned_area(),
                "Polygon transformed"
            );
        }
        Ok(projected)
    }

    /// Surfaces par catégorie pour une zone déjà en EPSG:25833
    pub fn aggregate(&self, zone: &MultiPolygon) -> AreaSummary {
        ar5::aggregate(&self.dataset, zone, &self.codes)
    }

    /// Morceaux de recouvrement pour une zone déjà en EPSG:25833
    pub fn overlaps(&self, zone: &MultiPolygon) -> Vec<Overlap<'_>> {
        ar5::overlaps(&self.dataset, zone, &self.codes)
    }
}

/// Convertit une géométrie GeoJSON en multipolygone
///
/// Seuls Polygon, MultiPolygon et une Feature portant l'un des deux sont
/// acceptés. Chaque anneau doit compter au moins 4 positions et ne pas se
/// recouper.
pub fn parse_polygon(value: &Value) -> Result<MultiPolygon, AnalysisError> {
    let geojson = geojson::GeoJson::from_json_value(value.clone())
        .map_err(|e| AnalysisError::Geometry(format!("Invalid GeoJSON geometry: {}", e)))?;

    let geometry = match geojson {
        geojson::GeoJson::Geometry(geometry) => geometry,
        geojson::GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| AnalysisError::Geometry("Feature has no geometry".to_string()))?,
        geojson::GeoJson::FeatureCollection(_) => {
            return Err(AnalysisError::Geometry(
                "Expected a Polygon or MultiPolygon, got FeatureCollection".to_string(),
            ))
        }
    };

    let rings_ok = match &geometry.value {
        geojson::Value::Polygon(rings) => valid_rings(rings),
        geojson::Value::MultiPolygon(polygons) => {
            !polygons.is_empty() && polygons.iter().all(|rings| valid_rings(rings))
        }
        other => {
            return Err(AnalysisError::Geometry(format!(
                "Expected a Polygon or MultiPolygon, got {}",
                geometry_type(other)
            )))
        }
    };
    if !rings_ok {
        return Err(AnalysisError::Geometry(
            "Polygon rings must contain at least 4 positions".to_string(),
        ));
    }

    let zone = match Geometry::<f64>::try_from(geometry) {
        Ok(Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon]),
        Ok(Geometry::MultiPolygon(mp)) => mp,
        Ok(_) => {
            return Err(AnalysisError::Geometry(
                "Expected a Polygon or MultiPolygon".to_string(),
            ))
        }
        Err(e) => return Err(AnalysisError::Geometry(e.to_string())),
    };

    let crossing = zone
        .0
        .iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .any(ring_self_intersects);
    if crossing {
        return Err(AnalysisError::Geometry(
            "Polygon ring is self-intersecting".to_string(),
        ));
    }

    Ok(zone)
}

fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn valid_rings(rings: &[Vec<Vec<f64>>]) -> bool {
    !rings.is_empty()
        && rings
            .iter()
            .all(|ring| ring.len() >= 4 && ring.iter().all(|position| position.len() >= 2))
}

/// Vrai si deux segments non consécutifs de l'anneau se touchent
fn ring_self_intersects(ring: &LineString) -> bool {
    let mut coords = ring.0.clone();
    coords.dedup();
    let segments: Vec<Line> = coords.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = segments.len();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                // Sommet partagé
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return true,
            }
        }
    }
    false
}

/// Représentation WKT d'une géométrie (pour les logs)
pub fn to_wkt(geometry: &Geometry) -> String {
    let mut buf = Vec::new();
    {
        let mut writer = WktWriter::new(&mut buf);
        if geometry.process_geom(&mut writer).is_err() {
            return String::new();
        }
    }
    String::from_utf8(buf).unwrap_or_default()
}
