//! Masque de couverture: +1 sur les pixels valides, -1 sur le NoData

use crate::nodata::Normalized;

/// Valeur du masque pour un pixel couvert
pub const MASK_INSIDE: f64 = 1.0;

/// Valeur du masque pour un pixel NoData
pub const MASK_OUTSIDE: f64 = -1.0;

/// Construit le masque binaire de couverture
pub fn build_mask(normalized: &Normalized) -> Vec<f64> {
    normalized
        .data
        .iter()
        .map(|&value| {
            if normalized.is_valid(value) {
                MASK_INSIDE
            } else {
                MASK_OUTSIDE
            }
        })
        .collect()
}

/// Nombre de pixels couverts dans un masque
pub fn covered_pixels(mask: &[f64]) -> usize {
    mask.iter().filter(|&&v| v == MASK_INSIDE).count()
}
