//! # arealanalyse
//!
//! Surface d'occupation du sol AR5 à l'intérieur d'un polygone, servie en
//! HTTP ou calculée en batch.
//!
//! ## Features
//!
//! - Jeu AR5 chargé une seule fois, partagé en lecture seule
//! - Reprojection EPSG:4326 → EPSG:25833 en Rust pur (PROJ en option)
//! - API HTTP actix-web avec CORS ouvert
//! - Export GeoJSON des morceaux de recouvrement
//!
//! ## Usage CLI
//!
//! ```bash
//! # Service HTTP (défaut)
//! arealanalyse --data ./ar5.geojson --port 5000
//! curl -X POST localhost:5000/analyze -d '{"polygon": {"type": "Polygon", "coordinates": [...]}}'
//!
//! # Analyse batch du polygone de test
//! arealanalyse analyze --data ./ar5/ --codes ar50 --overlaps overlaps.geojson
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod report;
#[cfg(feature = "reproject")]
pub mod reproject;
pub mod reproject_lite;
pub mod server;

pub use analysis::Analyzer;
pub use config::Config;
pub use error::AnalysisError;
pub use report::{AnalysisReport, DatasetInfo};
