//! Intersection d'une zone avec les features AR5 et agrégation des surfaces
//!
//! La zone doit être exprimée dans la projection du jeu (métrique), les
//! surfaces sont planaires.

use std::borrow::Cow;

use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon};
use tracing::debug;

use crate::codes::CodeTable;
use crate::dataset::Dataset;
use crate::summary::{round2, AreaSummary};
use crate::types::Feature;

/// Recouvrement entre la zone et une feature
#[derive(Debug, Clone)]
pub struct Overlap<'a> {
    /// Feature recouverte
    pub feature: &'a Feature,

    /// Nom de catégorie résolu depuis le code
    pub name: Cow<'a, str>,

    /// Partie de la zone située dans la feature
    pub geometry: MultiPolygon,

    /// Surface planaire de `geometry` (non arrondie)
    pub area: f64,
}

/// Calcule les recouvrements de surface strictement positive
///
/// Les contacts par arête ou par sommet ne produisent aucun recouvrement.
/// Les membres de la zone qui se chevauchent sont fusionnés au préalable.
pub fn overlaps<'a>(
    dataset: &'a Dataset,
    zone: &MultiPolygon,
    codes: &'a CodeTable,
) -> Vec<Overlap<'a>> {
    let zone: &MultiPolygon = &dissolve(zone);
    let Some(bounds) = zone.bounding_rect() else {
        return Vec::new();
    };

    dataset
        .candidates(&bounds)
        .filter(|feature| feature.geometry.intersects(zone))
        .filter_map(|feature| {
            let geometry = feature.geometry.intersection(zone);
            let area = geometry.unsigned_area();
            if !(area > 0.0) {
                return None;
            }

            let name = codes.resolve(&feature.code);
            debug!(
                code = %feature.code,
                name = %name,
                area = round2(area),
                "Overlap"
            );
            Some(Overlap {
                feature,
                name,
                geometry,
                area,
            })
        })
        .collect()
}

/// Union des membres d'un multipolygone
///
/// Les opérations booléennes remplissent un multipolygone en pair-impair :
/// deux membres superposés s'annuleraient.
pub fn dissolve(zone: &MultiPolygon) -> Cow<'_, MultiPolygon> {
    let Some((first, rest)) = zone.0.split_first() else {
        return Cow::Borrowed(zone);
    };
    if rest.is_empty() {
        return Cow::Borrowed(zone);
    }

    let merged = rest.iter().fold(MultiPolygon::new(vec![first.clone()]), |acc, polygon| {
        acc.union(&MultiPolygon::new(vec![polygon.clone()]))
    });
    Cow::Owned(merged)
}

/// Surface recouverte par catégorie
pub fn aggregate(dataset: &Dataset, zone: &MultiPolygon, codes: &CodeTable) -> AreaSummary {
    summarize(&overlaps(dataset, zone, codes))
}

/// Cumule des recouvrements déjà calculés, dans leur ordre
pub fn summarize(pieces: &[Overlap<'_>]) -> AreaSummary {
    let mut summary = AreaSummary::new();
    for overlap in pieces {
        summary.add(&overlap.name, overlap.area);
    }
    summary
}
