//! Rapports : métadonnées du jeu et résultat d'une analyse batch
//!
//! Sérialisables en JSON (endpoint `/dataset`, option `--json`) ou affichés
//! sur la console.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use ar5::summary::round2;
use ar5::AreaSummary;
use serde::Serialize;

use crate::analysis::Analyzer;

/// Métadonnées du jeu chargé
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    /// Nombre de flates
    pub features: usize,
    /// Couches, dans l'ordre de lecture
    pub layers: Vec<String>,
    /// Projection de calcul
    pub epsg: u32,
    /// Projection des couches sur disque
    pub source_epsg: u32,
    /// Emprise `[minx, miny, maxx, maxy]` en projection de calcul
    pub bounds: Option<[f64; 4]>,
    /// Empreinte BLAKE3 des fichiers sources
    pub fingerprint: String,
    /// Attribut portant le code
    pub code_field: String,
    /// Nombre d'entrées de la table de codes
    pub codes: usize,
    /// Enregistrements non surfaciques ignorés
    pub skipped: usize,
}

impl DatasetInfo {
    pub fn from_analyzer(analyzer: &Analyzer) -> Self {
        let dataset = analyzer.dataset();
        Self {
            features: dataset.len(),
            layers: dataset.layers().to_vec(),
            epsg: dataset.projection().epsg,
            source_epsg: analyzer.source_epsg(),
            bounds: dataset
                .bounds()
                .map(|b| [b.min().x, b.min().y, b.max().x, b.max().y]),
            fingerprint: dataset.fingerprint().to_string(),
            code_field: analyzer.code_field().to_string(),
            codes: analyzer.codes().len(),
            skipped: dataset.skipped(),
        }
    }

    /// Affiche les métadonnées sur la console
    pub fn display(&self) {
        println!("Features: {}", self.features);
        println!("Layers: {}", self.layers.join(", "));
        if self.source_epsg != self.epsg {
            println!("CRS: EPSG:{} (reprojected from EPSG:{})", self.epsg, self.source_epsg);
        } else {
            println!("CRS: EPSG:{}", self.epsg);
        }
        match self.bounds {
            Some([minx, miny, maxx, maxy]) => {
                println!("Bounds: [{:.2}, {:.2}, {:.2}, {:.2}]", minx, miny, maxx, maxy)
            }
            None => println!("Bounds: (empty dataset)"),
        }
        println!("Code field: {} ({} known codes)", self.code_field, self.codes);
        println!("Skipped records: {}", self.skipped);
        println!("Fingerprint: {}", self.fingerprint);
    }
}

/// Résultat d'une analyse batch
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Surface planaire du polygone en EPSG:25833
    pub polygon_area: f64,
    /// Surface par catégorie
    pub categories: AreaSummary,
    /// Somme des catégories
    pub total: f64,
    /// Nombre de flates recouvertes
    pub overlaps: usize,
    /// Durée du calcul
    pub duration_secs: f64,
}

impl AnalysisReport {
    pub fn new(polygon_area: f64, categories: AreaSummary, overlaps: usize, duration: Duration) -> Self {
        Self {
            polygon_area: round2(polygon_area),
            total: categories.total(),
            categories,
            overlaps,
            duration_secs: duration.as_secs_f64(),
        }
    }

    /// Part du polygone couverte par le jeu, en pourcentage
    pub fn coverage(&self) -> f64 {
        if self.polygon_area > 0.0 {
            self.total / self.polygon_area * 100.0
        } else {
            0.0
        }
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("AREA ANALYSIS");
        println!("{}", "=".repeat(60));

        println!("\nPolygon area: {:.2} m²", self.polygon_area);
        println!("Duration: {:.3}s", self.duration_secs);

        if self.categories.is_empty() {
            println!("\nNo land-cover category found inside the polygon.");
        } else {
            println!("\n--- BY CATEGORY ({} overlaps) ---", self.overlaps);
            for (name, area) in self.categories.iter() {
                println!("  - {}: {:.2} m²", name, area);
            }
            println!("\nTotal: {:.2} m² ({:.1}% of polygon)", self.total, self.coverage());
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Résultat seul, au format de l'API HTTP
    pub fn categories_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.categories)?)
    }

    /// Sauvegarde le rapport complet en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} categories, {:.2} m² of {:.2} m²",
            self.categories.len(),
            self.total,
            self.polygon_area
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AnalysisReport {
        let mut categories = AreaSummary::new();
        categories.add("Tettbebyggelse", 7000.004);
        categories.add("Innmarksbeite", 3000.0);
        AnalysisReport::new(12500.0, categories, 3, Duration::from_millis(12))
    }

    #[test]
    fn test_report_totals() {
        let report = report();
        assert_eq!(report.total, 10000.0);
        assert_eq!(report.overlaps, 3);
        assert!((report.coverage() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report() {
        let report = AnalysisReport::new(100.0, AreaSummary::new(), 0, Duration::ZERO);
        assert_eq!(report.total, 0.0);
        assert_eq!(report.coverage(), 0.0);
        assert_eq!(report.categories_json().unwrap(), "{}");
    }

    #[test]
    fn test_summary() {
        let summary = report().summary();
        assert!(summary.contains("2 categories"));
        assert!(summary.contains("10000.00 m²"));
    }

    #[test]
    fn test_save_to_file() {
        let path = std::env::temp_dir().join("arealanalyse_report_test.json");
        report().save_to_file(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["categories"]["Innmarksbeite"], 3000.0);
        assert_eq!(value["polygon_area"], 12500.0);

        std::fs::remove_file(path).ok();
    }
}
