//! Jeu de données AR5 chargé en mémoire

use std::fmt;

use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::RTree;

use crate::index::{self, FeatureEnvelope};
use crate::types::{Feature, Layer, Projection};
use crate::Ar5Error;

/// Jeu AR5 complet, immuable après chargement
///
/// Les features sont indexées par emprise ; l'ordre du vecteur est l'ordre
/// de lecture des couches.
pub struct Dataset {
    features: Vec<Feature>,
    projection: Projection,
    bounds: Option<Rect>,
    layers: Vec<String>,
    skipped: usize,
    fingerprint: String,
    index: RTree<FeatureEnvelope>,
}

impl Dataset {
    /// Construit un jeu depuis des features déjà en mémoire
    pub fn new(features: Vec<Feature>, projection: Projection) -> Self {
        let mut layers: Vec<String> = Vec::new();
        for feature in &features {
            if !layers.contains(&feature.layer) {
                layers.push(feature.layer.clone());
            }
        }

        let bounds = total_bounds(&features);
        let index = index::build(&features);

        Self {
            features,
            projection,
            bounds,
            layers,
            skipped: 0,
            fingerprint: String::new(),
            index,
        }
    }

    /// Assemble des couches parsées ; toutes doivent partager la même projection
    pub fn from_layers(layers: Vec<Layer>, fingerprint: String) -> Result<Self, Ar5Error> {
        let Some(first) = layers.first() else {
            return Ok(Self::new(Vec::new(), Projection::default()));
        };
        let projection = first.projection;

        if let Some(other) = layers.iter().find(|l| l.projection != projection) {
            return Err(Ar5Error::CrsMismatch {
                layer: other.name.clone(),
                found: other.projection.epsg,
                expected: projection.epsg,
            });
        }

        let names: Vec<String> = layers.iter().map(|l| l.name.clone()).collect();
        let skipped = layers.iter().map(|l| l.skipped).sum();
        let features = layers.into_iter().flat_map(|l| l.features).collect();

        let mut dataset = Self::new(features, projection);
        dataset.layers = names;
        dataset.skipped = skipped;
        dataset.fingerprint = fingerprint;
        Ok(dataset)
    }

    /// Transforme toutes les géométries (reprojection au chargement)
    ///
    /// Le jeu retourné est réindexé et porte la nouvelle projection.
    pub fn try_map_geometries<E, F>(self, projection: Projection, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&MultiPolygon) -> Result<MultiPolygon, E>,
    {
        let features = self
            .features
            .into_iter()
            .map(|feature| {
                Ok(Feature {
                    geometry: f(&feature.geometry)?,
                    ..feature
                })
            })
            .collect::<Result<Vec<_>, E>>()?;

        let mut dataset = Self::new(features, projection);
        dataset.layers = self.layers;
        dataset.skipped = self.skipped;
        dataset.fingerprint = self.fingerprint;
        Ok(dataset)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Emprise totale (`None` pour un jeu vide)
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Nombre d'enregistrements non surfaciques ignorés au chargement
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Empreinte BLAKE3 des fichiers sources (vide pour un jeu construit en mémoire)
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features dont l'emprise intersecte `rect`, dans l'ordre du jeu
    pub fn candidates<'a>(&'a self, rect: &Rect) -> impl Iterator<Item = &'a Feature> + 'a {
        index::candidates(&self.index, rect)
            .into_iter()
            .map(move |position| &self.features[position])
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("features", &self.features.len())
            .field("projection", &self.projection)
            .field("bounds", &self.bounds)
            .field("layers", &self.layers)
            .field("skipped", &self.skipped)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

fn total_bounds(features: &[Feature]) -> Option<Rect> {
    features
        .iter()
        .filter_map(|f| f.geometry.bounding_rect())
        .reduce(|acc, r| {
            Rect::new(
                geo::coord! { x: acc.min().x.min(r.min().x), y: acc.min().y.min(r.min().y) },
                geo::coord! { x: acc.max().x.max(r.max().x), y: acc.max().y.max(r.max().y) },
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(id: &str, layer: &str, x0: f64, y0: f64, size: f64) -> Feature {
        Feature {
            id: id.to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: x0, y: y0),
                (x: x0 + size, y: y0),
                (x: x0 + size, y: y0 + size),
                (x: x0, y: y0 + size),
            ]]),
            code: "81".to_string(),
            layer: layer.to_string(),
        }
    }

    #[test]
    fn test_bounds_and_layers() {
        let dataset = Dataset::new(
            vec![
                square("a", "flate", 0.0, 0.0, 10.0),
                square("b", "flate", 100.0, 50.0, 10.0),
                square("c", "grense", -5.0, 20.0, 1.0),
            ],
            Projection::default(),
        );

        let bounds = dataset.bounds().unwrap();
        assert_eq!(bounds.min().x, -5.0);
        assert_eq!(bounds.min().y, 0.0);
        assert_eq!(bounds.max().x, 110.0);
        assert_eq!(bounds.max().y, 60.0);
        assert_eq!(dataset.layers(), &["flate".to_string(), "grense".to_string()]);
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_candidates_in_dataset_order() {
        let features = (0..50)
            .map(|i| square(&i.to_string(), "flate", i as f64 * 10.0, 0.0, 10.0))
            .collect();
        let dataset = Dataset::new(features, Projection::default());

        let rect = Rect::new(geo::coord! { x: 95.0, y: 1.0 }, geo::coord! { x: 125.0, y: 2.0 });
        let ids: Vec<&str> = dataset.candidates(&rect).map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "10", "11", "12"]);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::from_layers(Vec::new(), String::new()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.bounds().is_none());
    }

    #[test]
    fn test_crs_mismatch() {
        let layers = vec![
            Layer {
                name: "a".into(),
                projection: Projection::new(25833),
                features: vec![],
                skipped: 0,
            },
            Layer {
                name: "b".into(),
                projection: Projection::new(25832),
                features: vec![],
                skipped: 0,
            },
        ];
        match Dataset::from_layers(layers, String::new()) {
            Err(Ar5Error::CrsMismatch {
                layer,
                found,
                expected,
            }) => {
                assert_eq!(layer, "b");
                assert_eq!(found, 25832);
                assert_eq!(expected, 25833);
            }
            other => panic!("Expected CrsMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_map_geometries_reindexes() {
        let dataset = Dataset::new(vec![square("a", "flate", 0.0, 0.0, 1.0)], Projection::new(4326));
        let shifted = dataset
            .try_map_geometries(Projection::new(25833), |mp| {
                Ok::<_, ()>(geo::MapCoords::map_coords(mp, |c| geo::coord! { x: c.x + 1000.0, y: c.y }))
            })
            .unwrap();

        assert_eq!(shifted.projection().epsg, 25833);
        assert_eq!(shifted.bounds().unwrap().min().x, 1000.0);
        let rect = Rect::new(geo::coord! { x: 1000.5, y: 0.5 }, geo::coord! { x: 1000.6, y: 0.6 });
        assert_eq!(shifted.candidates(&rect).count(), 1);
    }
}
