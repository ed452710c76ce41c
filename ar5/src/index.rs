//! Index spatial des emprises de features (R-tree)

use geo::{BoundingRect, Rect};
use rstar::{RTree, RTreeObject, AABB};

use crate::types::Feature;

/// Emprise d'une feature, repérée par sa position dans le jeu
#[derive(Debug, Clone)]
pub(crate) struct FeatureEnvelope {
    pub(crate) position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for FeatureEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

pub(crate) fn to_aabb(rect: &Rect) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Construit l'index en un seul chargement (bulk load)
pub(crate) fn build(features: &[Feature]) -> RTree<FeatureEnvelope> {
    let envelopes = features
        .iter()
        .enumerate()
        .filter_map(|(position, feature)| {
            let rect = feature.geometry.bounding_rect()?;
            Some(FeatureEnvelope {
                position,
                envelope: to_aabb(&rect),
            })
        })
        .collect();

    RTree::bulk_load(envelopes)
}

/// Positions des features dont l'emprise touche `rect`, dans l'ordre du jeu
pub(crate) fn candidates(tree: &RTree<FeatureEnvelope>, rect: &Rect) -> Vec<usize> {
    let mut positions: Vec<usize> = tree
        .locate_in_envelope_intersecting(&to_aabb(rect))
        .map(|e| e.position)
        .collect();
    positions.sort_unstable();
    positions
}
