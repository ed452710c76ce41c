//! Détection du système de coordonnées d'une couche GeoJSON
//!
//! Les exports AR5 (ogr2ogr, QGIS) conservent le membre `crs` historique :
//! `{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::25833"}}`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::Ar5Error;

fn epsg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)EPSG:{1,2}(?:[0-9.]*:)?([0-9]+)$").expect("valid EPSG regex")
    })
}

/// Extrait le code EPSG d'un nom de CRS
pub fn epsg_from_name(name: &str) -> Option<u32> {
    let name = name.trim();
    if name.ends_with("CRS84") || name.ends_with("crs84") {
        return Some(4326);
    }
    epsg_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Interprète le membre `crs` d'une FeatureCollection
pub fn epsg_from_member(crs: &Value) -> Result<u32, Ar5Error> {
    let properties = crs.get("properties");

    if let Some(name) = properties.and_then(|p| p.get("name")).and_then(Value::as_str) {
        return epsg_from_name(name).ok_or_else(|| Ar5Error::UnknownCrs(name.to_string()));
    }

    // Forme GeoJSON 2008 : {"type": "EPSG", "properties": {"code": 4326}}
    if let Some(code) = properties.and_then(|p| p.get("code")).and_then(Value::as_u64) {
        return u32::try_from(code).map_err(|_| Ar5Error::UnknownCrs(code.to_string()));
    }

    Err(Ar5Error::UnknownCrs(crs.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_epsg_from_urn() {
        assert_eq!(epsg_from_name("urn:ogc:def:crs:EPSG::25833"), Some(25833));
        assert_eq!(epsg_from_name("urn:ogc:def:crs:EPSG:6.6:25833"), Some(25833));
        assert_eq!(epsg_from_name("EPSG:4326"), Some(4326));
        assert_eq!(epsg_from_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(4326));
        assert_eq!(epsg_from_name("ETRS89 / UTM zone 33N"), None);
    }

    #[test]
    fn test_epsg_from_member() {
        let named = json!({"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::25833"}});
        assert_eq!(epsg_from_member(&named).unwrap(), 25833);

        let legacy = json!({"type": "EPSG", "properties": {"code": 32633}});
        assert_eq!(epsg_from_member(&legacy).unwrap(), 32633);
    }

    #[test]
    fn test_unknown_crs_member() {
        let unknown = json!({"type": "name", "properties": {"name": "LOCAL_CS"}});
        match epsg_from_member(&unknown) {
            Err(Ar5Error::UnknownCrs(name)) => assert_eq!(name, "LOCAL_CS"),
            other => panic!("Expected UnknownCrs, got {:?}", other),
        }
    }
}
