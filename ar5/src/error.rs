//! Types d'erreurs pour le crate ar5

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement d'un jeu AR5
#[derive(Debug, Error)]
pub enum Ar5Error {
    /// Erreur d'I/O lors de la lecture d'une couche
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Contenu qui n'est pas de l'UTF-8 valide
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(PathBuf),

    /// GeoJSON illisible
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// Format de fichier ou de dossier non pris en charge
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// Aucune couche trouvée
    #[error("No layer found in {0}")]
    NoLayer(PathBuf),

    /// Les couches ne partagent pas le même système de coordonnées
    #[error("CRS mismatch: layer {layer} is EPSG:{found}, expected EPSG:{expected}")]
    CrsMismatch {
        layer: String,
        found: u32,
        expected: u32,
    },

    /// Système de coordonnées non reconnu
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    /// Preset de table de codes inconnu
    #[error("Unknown code table preset: {0}. Use: ar5, ar50")]
    UnknownPreset(String),

    /// Table de codes JSON invalide
    #[error("Invalid code table: {0}")]
    InvalidCodeTable(#[from] serde_json::Error),
}

impl Ar5Error {
    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
