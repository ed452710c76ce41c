//! Définition et implémentation des commandes CLI
//!
//! - `serve` (défaut) : charge le jeu AR5 et sert l'API HTTP
//! - `analyze` : analyse batch d'un polygone
//! - `info` : métadonnées du jeu

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use arealanalyse::analysis::{self, Analyzer, ANALYSIS_EPSG};
use arealanalyse::report::{AnalysisReport, DatasetInfo};
use arealanalyse::{export, server, Config};
use clap::{Args, Subcommand};
use geo::{Area, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use tracing::info;

/// Polygone de test (est de Hamar), en EPSG:4326
pub const HAMAR_TEST_POLYGON: [(f64, f64); 5] = [
    (11.1003, 60.7889),
    (11.1020, 60.7889),
    (11.1020, 60.7902),
    (11.1003, 60.7902),
    (11.1003, 60.7889),
];

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API (default command)
    Serve(ServeArgs),

    /// Analyse one polygon and print the area per land-cover category
    Analyze {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// GeoJSON file holding the polygon in EPSG:4326 (geometry, Feature or {"polygon": ...}).
        /// Defaults to the built-in test polygon east of Hamar
        #[arg(short, long)]
        polygon: Option<PathBuf>,

        /// Print the result as JSON (same format as the HTTP API)
        #[arg(long)]
        json: bool,

        /// Write the overlap pieces to a GeoJSON file (EPSG:25833)
        #[arg(long)]
        overlaps: Option<PathBuf>,

        /// Save the full report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Load the dataset and print its metadata
    Info {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options du jeu AR5 (surchargent l'environnement)
#[derive(Args, Debug, Clone, Default)]
pub struct DatasetArgs {
    /// AR5 dataset: GeoJSON layer file or directory of layers (défaut : env AR5_PATH / data/ar5)
    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    /// Attribute holding the land-cover code (défaut : env AR5_CODE_FIELD / artype)
    #[arg(long)]
    pub code_field: Option<String>,

    /// Code table: preset name (ar5, ar50) or path to a JSON file (défaut : env AR5_CODES / ar5)
    #[arg(long)]
    pub codes: Option<String>,

    /// EPSG of layers without a crs member (défaut : env AR5_EPSG / 25833)
    #[arg(long)]
    pub epsg: Option<u32>,
}

/// Options du serveur HTTP (surchargent l'environnement)
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Listen address (défaut : env AREAL_HOST / 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (défaut : env AREAL_PORT / 5000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Number of HTTP workers (défaut : env AREAL_WORKERS / one per core)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Maximum request body size in bytes (défaut : env AREAL_MAX_BODY / 2 MiB)
    #[arg(long)]
    pub max_body: Option<usize>,
}

pub fn apply_dataset_overrides(config: &mut Config, args: &DatasetArgs) {
    if let Some(ref data) = args.data {
        config.dataset_path = data.clone();
    }
    if let Some(ref code_field) = args.code_field {
        config.code_field = code_field.clone();
    }
    if let Some(ref codes) = args.codes {
        config.codes = codes.clone();
    }
    if let Some(epsg) = args.epsg {
        config.default_epsg = epsg;
    }
}

pub fn apply_serve_overrides(config: &mut Config, args: &ServeArgs) {
    apply_dataset_overrides(config, &args.dataset);
    if let Some(ref host) = args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(workers) = args.workers.filter(|&n| n > 0) {
        config.workers = Some(workers);
    }
    if let Some(max_body) = args.max_body {
        config.max_body = max_body;
    }
}

/// Exécute la commande serve
pub async fn cmd_serve(config: &Config) -> Result<()> {
    info!(path = %config.dataset_path.display(), codes = %config.codes, "Starting service");

    let analyzer = Analyzer::from_config(config)?;
    let metadata = DatasetInfo::from_analyzer(&analyzer);
    info!(
        features = metadata.features,
        layers = metadata.layers.len(),
        epsg = metadata.epsg,
        source_epsg = metadata.source_epsg,
        fingerprint = %metadata.fingerprint,
        "Dataset ready"
    );

    server::run(config, analyzer).await
}

/// Exécute la commande analyze
pub fn cmd_analyze(
    config: &Config,
    polygon: Option<&Path>,
    json: bool,
    overlaps_output: Option<&Path>,
    report_output: Option<&Path>,
) -> Result<()> {
    let zone = match polygon {
        Some(path) => read_polygon(path)?,
        None => {
            info!("No polygon given, using the test polygon east of Hamar");
            hamar_test_polygon()
        }
    };

    let analyzer = Analyzer::from_config(config)?;

    let started = Instant::now();
    let projected = analyzer.project(&zone)?;
    let pieces = analyzer.overlaps(&projected);
    let categories = ar5::summarize(&pieces);
    let report = AnalysisReport::new(
        ar5::dissolve(&projected).unsigned_area(),
        categories,
        pieces.len(),
        started.elapsed(),
    );
    info!(summary = %report.summary(), "Analysis done");

    if json {
        println!("{}", report.categories_json()?);
    } else {
        report.display();
    }

    if let Some(path) = overlaps_output {
        export::export_overlaps(&pieces, ANALYSIS_EPSG, path)?;
        info!(path = %path.display(), overlaps = pieces.len(), "Overlaps exported");
    }

    if let Some(path) = report_output {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(())
}

/// Exécute la commande info
pub fn cmd_info(config: &Config, json: bool) -> Result<()> {
    let analyzer = Analyzer::from_config(config)?;
    let metadata = DatasetInfo::from_analyzer(&analyzer);

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        println!("Dataset: {}", config.dataset_path.display());
        metadata.display();
    }

    Ok(())
}

/// Polygone de test en EPSG:4326
pub fn hamar_test_polygon() -> MultiPolygon {
    MultiPolygon::new(vec![Polygon::new(
        LineString::from(HAMAR_TEST_POLYGON.to_vec()),
        vec![],
    )])
}

/// Lit un polygone GeoJSON depuis un fichier
fn read_polygon(path: &Path) -> Result<MultiPolygon> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read polygon file: {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse polygon file: {}", path.display()))?;

    // Corps de requête HTTP accepté tel quel
    if let Some(polygon) = value.get_mut("polygon") {
        value = polygon.take();
    }

    let zone = analysis::parse_polygon(&value)
        .with_context(|| format!("Invalid polygon in {}", path.display()))?;
    Ok(zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamar_polygon_is_closed() {
        let zone = hamar_test_polygon();
        let ring = zone.0[0].exterior();
        assert_eq!(ring.0.len(), 5);
        assert_eq!(ring.0.first(), ring.0.last());
    }

    #[test]
    fn test_dataset_overrides() {
        let mut config = Config::default();
        apply_dataset_overrides(
            &mut config,
            &DatasetArgs {
                data: Some(PathBuf::from("/tmp/ar5.geojson")),
                codes: Some("ar50".to_string()),
                ..DatasetArgs::default()
            },
        );
        assert_eq!(config.dataset_path, PathBuf::from("/tmp/ar5.geojson"));
        assert_eq!(config.codes, "ar50");
        assert_eq!(config.code_field, "artype");
    }

    #[test]
    fn test_serve_overrides() {
        let mut config = Config::default();
        apply_serve_overrides(
            &mut config,
            &ServeArgs {
                port: Some(8080),
                workers: Some(0),
                ..ServeArgs::default()
            },
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.workers, None);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_read_polygon_request_body() {
        let path = std::env::temp_dir().join("arealanalyse_polygon_test.json");
        std::fs::write(
            &path,
            r#"{"polygon": {"type": "Polygon", "coordinates": [[[11.1003, 60.7889], [11.102, 60.7889], [11.102, 60.7902], [11.1003, 60.7889]]]}}"#,
        )
        .unwrap();

        let zone = read_polygon(&path).unwrap();
        assert_eq!(zone.0.len(), 1);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_polygon_rejects_point() {
        let path = std::env::temp_dir().join("arealanalyse_point_test.json");
        std::fs::write(&path, r#"{"type": "Point", "coordinates": [11.1, 60.7]}"#).unwrap();

        assert!(read_polygon(&path).is_err());

        std::fs::remove_file(path).ok();
    }
}
