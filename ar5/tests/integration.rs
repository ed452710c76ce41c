//! Tests d'intégration sur un extrait AR5 autour de Hamar

use std::path::Path;

use ar5::{aggregate, overlaps, Ar5Error, CodeTable, LoadOptions};
use geo::{polygon, Area, MultiPolygon};

const FIXTURE: &str = "tests/fixtures/hamar_ar5.geojson";

/// Polygone de test du service, déjà projeté en UTM 33N
fn hamar_zone() -> MultiPolygon {
    MultiPolygon::new(vec![polygon![
        (x: 287769.074, y: 6745582.039),
        (x: 287861.517, y: 6745576.540),
        (x: 287870.118, y: 6745721.160),
        (x: 287777.679, y: 6745726.659),
    ]])
}

#[test]
fn test_load_fixture() {
    let dataset = ar5::load(Path::new(FIXTURE), &LoadOptions::default()).unwrap();

    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.skipped(), 1, "LineString should be skipped");
    assert_eq!(dataset.projection().epsg, 25833);
    assert_eq!(dataset.layers(), &["hamar_ar5".to_string()]);
    assert_eq!(dataset.fingerprint().len(), 64);

    let bounds = dataset.bounds().unwrap();
    assert_eq!(bounds.min().x, 287600.0);
    assert_eq!(bounds.min().y, 6745400.0);
    assert_eq!(bounds.max().x, 288400.0);
    assert_eq!(bounds.max().y, 6745900.0);

    let codes: Vec<&str> = dataset.features().iter().map(|f| f.code.as_str()).collect();
    assert_eq!(codes, vec!["81", "30", "11", "F", "U"]);
}

#[test]
fn test_load_directory() {
    let dataset = ar5::load(Path::new("tests/fixtures"), &LoadOptions::default()).unwrap();
    assert_eq!(dataset.len(), 5);
}

#[test]
fn test_aggregate_hamar_zone() {
    let dataset = ar5::load(Path::new(FIXTURE), &LoadOptions::default()).unwrap();
    let codes = CodeTable::default();
    let zone = hamar_zone();

    let summary = aggregate(&dataset, &zone, &codes);
    let names: Vec<&str> = summary.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec!["Fulldyrka jord – åpen åker", "Innmarksbeite", "Tettbebyggelse"]
    );

    // La zone est entièrement couverte par le jeu
    assert!((summary.total() - zone.unsigned_area()).abs() < 1.0);
    for (name, area) in summary.iter() {
        assert!(area > 0.0, "{} should be positive", name);
    }
}

#[test]
fn test_aggregate_with_ar50_table() {
    let dataset = ar5::load(Path::new(FIXTURE), &LoadOptions::default()).unwrap();
    let codes = CodeTable::from_preset("ar50").unwrap();

    let summary = aggregate(&dataset, &hamar_zone(), &codes);
    assert!(summary.get("Bebygd område").is_some());
    assert!(summary.get("Tettbebyggelse").is_none());
}

#[test]
fn test_aggregate_with_custom_table() {
    let dataset = ar5::load(Path::new(FIXTURE), &LoadOptions::default()).unwrap();
    let codes = CodeTable::from_pairs([("81", "By"), ("30", "Beite")]);

    let summary = aggregate(&dataset, &hamar_zone(), &codes);
    assert!(summary.get("By").is_some());
    assert!(summary.get("Beite").is_some());
    assert!(summary.get("Ukjent arealtype (11)").is_some());
}

#[test]
fn test_hole_is_filled_by_other_feature() {
    let dataset = ar5::load(Path::new(FIXTURE), &LoadOptions::default()).unwrap();
    let codes = CodeTable::default();

    // Zone à cheval sur le trou de la flate 1004 et sur la flate 1006
    let zone = MultiPolygon::new(vec![polygon![
        (x: 288050.0, y: 6745550.0),
        (x: 288150.0, y: 6745550.0),
        (x: 288150.0, y: 6745560.0),
        (x: 288050.0, y: 6745560.0),
    ]]);

    let pieces = overlaps(&dataset, &zone, &codes);
    let ids: Vec<&str> = pieces.iter().map(|p| p.feature.id.as_str()).collect();
    assert_eq!(ids, vec!["1004", "1006"]);

    let summary = aggregate(&dataset, &zone, &codes);
    assert_eq!(summary.get("Skog"), Some(500.0));
    assert_eq!(summary.get("Ukjent / udefinert"), Some(500.0));
}

#[test]
fn test_custom_code_field() {
    let options = LoadOptions {
        code_field: "objtype".to_string(),
        ..LoadOptions::default()
    };
    let dataset = ar5::load(Path::new(FIXTURE), &options).unwrap();
    assert!(dataset.features().iter().all(|f| f.code == "U"));
}

#[test]
fn test_missing_dataset() {
    let result = ar5::load(Path::new("tests/fixtures/missing.gdb"), &LoadOptions::default());
    assert!(matches!(result, Err(Ar5Error::Io(_))));
}

#[test]
fn test_all_fixtures_load() {
    let mut count = 0;
    for entry in glob::glob("tests/fixtures/*.geojson").unwrap() {
        let path = entry.unwrap();
        let dataset = ar5::load(&path, &LoadOptions::default())
            .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        assert!(!dataset.is_empty());
        count += 1;
    }
    assert!(count > 0, "No fixtures found");
}
