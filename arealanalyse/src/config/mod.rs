//! Configuration du service
//!
//! Les valeurs viennent de l'environnement (`.env` chargé par dotenvy au
//! démarrage), puis les arguments CLI les surchargent.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ar5::{CodeTable, LoadOptions, DEFAULT_CODE_FIELD, DEFAULT_EPSG};
use serde::Serialize;
use tracing::warn;

/// Taille maximale du corps d'une requête par défaut (2 MiB)
pub const DEFAULT_MAX_BODY: usize = 2 * 1024 * 1024;

/// Configuration principale
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Fichier ou dossier de couches AR5
    pub dataset_path: PathBuf,

    /// Attribut portant le code AR5
    pub code_field: String,

    /// Preset de table de codes (`ar5`, `ar50`) ou chemin vers un JSON
    pub codes: String,

    /// Projection supposée des couches sans membre `crs`
    pub default_epsg: u32,

    pub host: String,
    pub port: u16,

    /// Nombre de workers HTTP (défaut actix : un par cœur)
    pub workers: Option<usize>,

    /// Taille maximale du corps d'une requête, en octets
    pub max_body: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/ar5"),
            code_field: DEFAULT_CODE_FIELD.to_string(),
            codes: "ar5".to_string(),
            default_epsg: DEFAULT_EPSG,
            host: "127.0.0.1".to_string(),
            port: 5000,
            workers: None,
            max_body: DEFAULT_MAX_BODY,
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration depuis une source clé → valeur
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            dataset_path: lookup("AR5_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            code_field: lookup("AR5_CODE_FIELD").unwrap_or(defaults.code_field),
            codes: lookup("AR5_CODES").unwrap_or(defaults.codes),
            default_epsg: parsed(&lookup, "AR5_EPSG").unwrap_or(defaults.default_epsg),
            host: lookup("AREAL_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "AREAL_PORT").unwrap_or(defaults.port),
            workers: parsed(&lookup, "AREAL_WORKERS").filter(|&n: &usize| n > 0),
            max_body: parsed(&lookup, "AREAL_MAX_BODY").unwrap_or(defaults.max_body),
        }
    }

    /// Options de chargement du jeu AR5
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            code_field: self.code_field.clone(),
            default_epsg: self.default_epsg,
        }
    }

    /// Construit la table de codes configurée
    pub fn code_table(&self) -> Result<CodeTable> {
        CodeTable::from_name_or_path(&self.codes)
            .with_context(|| format!("Failed to load code table '{}'", self.codes))
    }

    /// Adresse d'écoute `host:port`
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Lit et parse une variable ; une valeur invalide est ignorée
fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Invalid value in environment, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.dataset_path, PathBuf::from("data/ar5"));
        assert_eq!(config.code_field, "artype");
        assert_eq!(config.codes, "ar5");
        assert_eq!(config.default_epsg, 25833);
        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 5000));
        assert_eq!(config.workers, None);
        assert_eq!(config.max_body, 2 * 1024 * 1024);
    }

    #[test]
    fn test_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("AR5_PATH", "/srv/ar5/0000_25833_ar5_gdb"),
            ("AR5_CODE_FIELD", "arealtype"),
            ("AR5_CODES", "ar50"),
            ("AR5_EPSG", "25832"),
            ("AREAL_HOST", "0.0.0.0"),
            ("AREAL_PORT", "8080"),
            ("AREAL_WORKERS", "4"),
        ]));

        assert_eq!(config.dataset_path, PathBuf::from("/srv/ar5/0000_25833_ar5_gdb"));
        assert_eq!(config.code_field, "arealtype");
        assert_eq!(config.default_epsg, 25832);
        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 8080));
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.code_table().unwrap().get("81"), Some("Bebygd område"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("AREAL_PORT", "http"),
            ("AREAL_WORKERS", "0"),
            ("AR5_EPSG", "EPSG:25833"),
        ]));
        assert_eq!(config.port, 5000);
        assert_eq!(config.workers, None);
        assert_eq!(config.default_epsg, 25833);
    }

    #[test]
    fn test_unknown_code_table() {
        let config = Config {
            codes: "ar1000".to_string(),
            ..Config::default()
        };
        assert!(config.code_table().is_err());
    }
}
