//! Types de données pour le crate ar5

use geo::MultiPolygon;

/// Code attribué aux features sans attribut de classe
pub const DEFAULT_CODE: &str = "U";

/// Champ portant le code AR5 dans les exports Kartverket
pub const DEFAULT_CODE_FIELD: &str = "artype";

/// Projection des jeux AR5 (ETRS89 / UTM 33N)
pub const DEFAULT_EPSG: u32 = 25833;

/// Une flate (parcelle) AR5 avec sa géométrie et son code d'occupation du sol
#[derive(Debug, Clone)]
pub struct Feature {
    /// Identifiant de la feature (id GeoJSON, sinon `couche:index`)
    pub id: String,

    /// Géométrie surfacique, toujours normalisée en MultiPolygon
    pub geometry: MultiPolygon,

    /// Code AR5 (ex: "81", "F")
    pub code: String,

    /// Couche source
    pub layer: String,
}

/// Informations de projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// Code EPSG
    pub epsg: u32,
}

impl Projection {
    pub fn new(epsg: u32) -> Self {
        Self { epsg }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self { epsg: DEFAULT_EPSG }
    }
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Options de chargement d'un jeu AR5
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Nom de l'attribut portant le code AR5
    pub code_field: String,

    /// EPSG à supposer quand une couche ne déclare pas de CRS
    pub default_epsg: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            code_field: DEFAULT_CODE_FIELD.to_string(),
            default_epsg: DEFAULT_EPSG,
        }
    }
}

/// Contenu d'une couche après parsing
#[derive(Debug)]
pub struct Layer {
    /// Nom de la couche (nom du fichier sans extension)
    pub name: String,

    /// Projection déclarée, ou celle par défaut
    pub projection: Projection,

    /// Features surfaciques
    pub features: Vec<Feature>,

    /// Enregistrements ignorés (points, lignes, géométries vides)
    pub skipped: usize,
}
