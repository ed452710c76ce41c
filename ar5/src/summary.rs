//! Résultat d'une analyse : surface cumulée par catégorie

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arrondi à deux décimales (affichage en m²)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Nom de catégorie → surface en m², triée par nom
///
/// Chaque surface est arrondie au centimètre carré avant d'être cumulée,
/// le total reste donc à deux décimales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaSummary(BTreeMap<String, f64>);

impl AreaSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une surface au total de la catégorie
    pub fn add(&mut self, name: &str, area: f64) {
        let total = self.0.entry(name.to_string()).or_insert(0.0);
        *total = round2(*total + round2(area));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Somme de toutes les catégories
    pub fn total(&self) -> f64 {
        round2(self.0.values().sum())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, area)| (name.as_str(), *area))
    }
}
