//! # ar5
//!
//! Chargement d'un jeu AR5 (occupation du sol, Kartverket / NIBIO) et calcul
//! des surfaces recouvertes par catégorie à l'intérieur d'une zone.
//!
//! ## Features
//!
//! - Couches GeoJSON (FeatureCollection ou une feature par ligne)
//! - Dossier de couches (équivalent d'une géodatabase), lu en parallèle
//! - Index R-tree des emprises
//! - Tables de codes AR5 embarquées ou chargées depuis JSON
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ar5::{load, overlap, CodeTable, LoadOptions};
//! use std::path::Path;
//!
//! let dataset = load(Path::new("data/ar5"), &LoadOptions::default())?;
//! let codes = CodeTable::from_preset("ar5")?;
//!
//! // `zone` en EPSG:25833
//! let summary = overlap::aggregate(&dataset, &zone, &codes);
//! for (name, area) in summary.iter() {
//!     println!("{}: {} m²", name, area);
//! }
//! ```

pub mod codes;
pub mod dataset;
pub mod error;
mod index;
pub mod overlap;
pub mod reader;
pub mod source;
pub mod summary;
pub mod types;

pub use codes::CodeTable;
pub use dataset::Dataset;
pub use error::Ar5Error;
pub use overlap::{aggregate, dissolve, overlaps, summarize, Overlap};
pub use summary::AreaSummary;
pub use types::{Feature, LoadOptions, Projection, DEFAULT_CODE, DEFAULT_CODE_FIELD, DEFAULT_EPSG};

use std::path::Path;

use tracing::info;

/// Charge un jeu AR5 (fichier de couche ou dossier de couches).
///
/// # Errors
///
/// Retourne `Ar5Error` si le chemin est illisible, si aucune couche n'est
/// trouvée, si une couche est mal formée ou si les couches ne partagent pas
/// la même projection.
pub fn load(path: &Path, options: &LoadOptions) -> Result<Dataset, Ar5Error> {
    let (layers, fingerprint) = source::read_layers(path, options)?;
    let dataset = Dataset::from_layers(layers, fingerprint)?;

    info!(
        path = %path.display(),
        features = dataset.len(),
        layers = dataset.layers().len(),
        skipped = dataset.skipped(),
        crs = %dataset.projection(),
        bounds = ?dataset.bounds().map(|b| [b.min().x, b.min().y, b.max().x, b.max().y]),
        "AR5 dataset loaded"
    );

    Ok(dataset)
}
