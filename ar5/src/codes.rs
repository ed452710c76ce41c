//! Table de correspondance code AR5 → nom de catégorie

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::Ar5Error;

/// Table code → nom, construite une fois au démarrage puis partagée en lecture seule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    names: HashMap<String, String>,
}

impl CodeTable {
    /// Charge une table depuis un fichier JSON `{"81": "Tettbebyggelse", ...}`
    pub fn load(path: &Path) -> Result<Self, Ar5Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Charge une table embarquée
    ///
    /// - `ar5`: table du service HTTP (défaut)
    /// - `ar50`: table du script d'analyse, groupements plus grossiers
    pub fn from_preset(preset: &str) -> Result<Self, Ar5Error> {
        match preset {
            "ar5" => Self::from_json(include_str!("presets/ar5.json")),
            "ar50" => Self::from_json(include_str!("presets/ar50.json")),
            _ => Err(Ar5Error::UnknownPreset(preset.to_string())),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn from_name_or_path(value: &str) -> Result<Self, Ar5Error> {
        let path = Path::new(value);
        if path.extension().map_or(false, |ext| ext == "json") || path.is_file() {
            Self::load(path)
        } else {
            Self::from_preset(value)
        }
    }

    fn from_json(json: &str) -> Result<Self, Ar5Error> {
        let names: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { names })
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Nom de la catégorie, ou `Ukjent arealtype (<code>)` si le code est absent
    pub fn resolve<'a>(&'a self, code: &str) -> Cow<'a, str> {
        match self.names.get(code) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(format!("Ukjent arealtype ({})", code)),
        }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::from_json(include_str!("presets/ar5.json")).unwrap_or_else(|_| Self {
            names: HashMap::new(),
        })
    }
}
