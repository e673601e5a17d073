//! # demraster
//!
//! Lecture/écriture de MNT (GeoTIFF via GDAL) et masques de couverture.
//!
//! ## Features
//!
//! - Chargement de la bande 1 avec géotransformation, projection et NoData
//! - Normalisation du NoData (altitudes hors `]-10000, 10000[` ramenées au NoData)
//! - Masque binaire +1 (valide) / -1 (NoData)
//! - Écriture GeoTIFF compressée LZW en reprenant le géoréférencement d'un template
//!
//! ## Usage
//!
//! ```rust,ignore
//! use demraster::{coverage_mask, ELEVATION_LIMIT_M};
//! use std::path::Path;
//!
//! let dem = demraster::read(Path::new("dem.tif"))?;
//! let mask = coverage_mask(&dem, ELEVATION_LIMIT_M);
//! demraster::write(&dem, &mask, Path::new("mask.tif"), None)?;
//! ```

pub mod error;
pub mod io;
pub mod mask;
pub mod nodata;
pub mod types;

pub use error::RasterError;
pub use io::{read, write, write_as};
pub use mask::{build_mask, covered_pixels, MASK_INSIDE, MASK_OUTSIDE};
pub use nodata::{normalize, Normalized, ELEVATION_LIMIT_M};
pub use types::{GeoTransform, PixelType, Raster};

/// Normalise un MNT puis construit son masque de couverture
pub fn coverage_mask(raster: &Raster, limit: f64) -> Vec<f64> {
    let normalized = normalize(raster, limit);
    build_mask(&normalized)
}
