//! Normalisation des valeurs NoData d'un MNT
//!
//! Les altitudes valides sont dans l'intervalle ouvert `]-limit, limit[`.
//! Un NoData déclaré hors de cet intervalle est remplacé par `limit`, et tout
//! pixel hors bornes est réécrit avec le NoData (éventuellement corrigé).

use tracing::debug;

use crate::types::Raster;

/// Limite d'altitude par défaut (mètres)
pub const ELEVATION_LIMIT_M: f64 = 10_000.0;

/// Pixels et NoData corrigés
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Pixels, ligne par ligne
    pub data: Vec<f64>,

    /// Valeur NoData effective
    pub no_data: f64,
}

impl Normalized {
    /// Vrai si le pixel porte une mesure valide
    pub fn is_valid(&self, value: f64) -> bool {
        value != self.no_data
    }
}

/// Corrige la valeur NoData déclarée
///
/// Un NoData absent est traité comme hors bornes.
pub fn corrected_no_data(declared: Option<f64>, limit: f64) -> f64 {
    match declared {
        Some(value) if -limit < value && value < limit => value,
        _ => limit,
    }
}

/// Normalise les pixels et le NoData d'un raster
pub fn normalize(raster: &Raster, limit: f64) -> Normalized {
    let no_data = corrected_no_data(raster.no_data, limit);

    let mut clamped = 0usize;
    let data = raster
        .data
        .iter()
        .map(|&value| {
            if value > limit || value < -limit || value.is_nan() {
                clamped += 1;
                no_data
            } else {
                value
            }
        })
        .collect();

    debug!(
        declared = ?raster.no_data,
        no_data,
        clamped,
        "NoData normalized"
    );

    Normalized { data, no_data }
}
