//! Découverte et lecture des couches d'un jeu AR5 sur disque
//!
//! Un jeu est soit un fichier de couche, soit un dossier (équivalent d'une
//! géodatabase) contenant une ou plusieurs couches.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::reader::{self, LayerKind};
use crate::types::{Layer, LoadOptions};
use crate::Ar5Error;

/// Collecte récursivement les fichiers de couche, triés par chemin
pub fn collect_layers(path: &Path) -> Result<Vec<PathBuf>, Ar5Error> {
    if path.is_file() {
        return match LayerKind::from_path(path) {
            Some(_) => Ok(vec![path.to_path_buf()]),
            None => Err(Ar5Error::UnsupportedFormat(format!(
                "{}: expected .geojson, .json, .geojsonl, .geojsons or .ndjson",
                path.display()
            ))),
        };
    }

    let mut layers = Vec::new();
    collect_into(path, &mut layers)?;
    layers.sort();

    if layers.is_empty() {
        if is_file_gdb(path) {
            return Err(Ar5Error::UnsupportedFormat(format!(
                "{} is an Esri FileGDB; export it first: ogr2ogr -f GeoJSON -t_srs EPSG:25833 ar5.geojson {}",
                path.display(),
                path.display()
            )));
        }
        return Err(Ar5Error::NoLayer(path.to_path_buf()));
    }

    Ok(layers)
}

fn collect_into(dir: &Path, layers: &mut Vec<PathBuf>) -> Result<(), Ar5Error> {
    for entry in std::fs::read_dir(dir)? {
        let entry_path = entry?.path();

        if entry_path.is_dir() {
            collect_into(&entry_path, layers)?;
        } else if LayerKind::from_path(&entry_path).is_some() {
            layers.push(entry_path);
        }
    }
    Ok(())
}

fn is_file_gdb(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gdb"))
}

/// Nom de couche : nom du fichier sans extension
pub fn layer_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("layer")
        .to_string()
}

/// Lit et parse toutes les couches en parallèle
///
/// Retourne les couches dans l'ordre des chemins et l'empreinte BLAKE3 du jeu.
pub fn read_layers(path: &Path, options: &LoadOptions) -> Result<(Vec<Layer>, String), Ar5Error> {
    let paths = collect_layers(path)?;

    let parsed: Vec<(Layer, blake3::Hash)> = paths
        .par_iter()
        .map(|layer_path| -> Result<(Layer, blake3::Hash), Ar5Error> {
            let data = std::fs::read(layer_path)?;
            let hash = blake3::hash(&data);
            let kind = LayerKind::from_path(layer_path)
                .ok_or_else(|| Ar5Error::UnsupportedFormat(layer_path.display().to_string()))?;

            let layer = reader::parse_layer(&layer_name(layer_path), kind, &data, options)?;
            debug!(
                layer = %layer.name,
                features = layer.features.len(),
                skipped = layer.skipped,
                epsg = layer.projection.epsg,
                "Layer parsed"
            );
            Ok((layer, hash))
        })
        .collect::<Result<_, _>>()?;

    let mut hasher = blake3::Hasher::new();
    let mut layers = Vec::with_capacity(parsed.len());
    for (layer, hash) in parsed {
        hasher.update(hash.as_bytes());
        layers.push(layer);
    }

    Ok((layers, hex::encode(hasher.finalize().as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ar5_source_{}_{}", name, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_collect_missing_path() {
        let result = collect_layers(Path::new("/nonexistent/ar5"));
        assert!(result.is_err());
    }

    #[test]
    fn test_collect_sorted_and_recursive() {
        let dir = temp_dir("collect");
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        std::fs::write(dir.join("b.geojson"), "{}").unwrap();
        std::fs::write(dir.join("a.geojsonl"), "").unwrap();
        std::fs::write(dir.join("sub/c.json"), "{}").unwrap();
        std::fs::write(dir.join("notes.txt"), "").unwrap();

        let layers = collect_layers(&dir).unwrap();
        let names: Vec<String> = layers.iter().map(|p| layer_name(p)).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_file_gdb_without_export() {
        let dir = temp_dir("fgdb").join("0000_25833_ar5_gdb.gdb");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a00000001.gdbtable"), "").unwrap();

        match collect_layers(&dir) {
            Err(Ar5Error::UnsupportedFormat(msg)) => assert!(msg.contains("ogr2ogr")),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }

        std::fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_empty_directory() {
        let dir = temp_dir("empty");
        assert!(matches!(collect_layers(&dir), Err(Ar5Error::NoLayer(_))));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let dir = temp_dir("fingerprint");
        std::fs::write(
            dir.join("flate.geojson"),
            r#"{"type":"FeatureCollection","features":[]}"#,
        )
        .unwrap();

        let options = LoadOptions::default();
        let (_, first) = read_layers(&dir, &options).unwrap();
        let (_, second) = read_layers(&dir, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        std::fs::remove_dir_all(dir).ok();
    }
}
