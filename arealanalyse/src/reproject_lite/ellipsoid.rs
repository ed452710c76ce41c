//! Définitions des ellipsoïdes

/// Ellipsoïde de référence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,

    /// Aplatissement
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84 (EPSG:326xx)
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257223563,
    };

    /// GRS80, ellipsoïde d'ETRS89 (EPSG:258xx)
    /// Note: Quasi identique à WGS84, différence < 0.1mm
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257222101,
    };

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// Deuxième excentricité au carré
    pub fn ep2(&self) -> f64 {
        self.e2() / (1.0 - self.e2())
    }
}
