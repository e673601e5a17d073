//! Types d'erreurs pour le crate demraster

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture/écriture d'un MNT
#[derive(Debug, Error)]
pub enum RasterError {
    /// Erreur d'I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur remontée par GDAL (ouverture, lecture, écriture)
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    /// Bande 1 absente: raster malformé
    #[error("Malformed raster {}: band 1 is missing", path.display())]
    MissingBand { path: PathBuf },

    /// Raster illisible ou incohérent
    #[error("Malformed raster {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// Type de pixel non géré
    #[error("Unsupported pixel data type {data_type} in {}", path.display())]
    UnsupportedDataType { path: PathBuf, data_type: String },

    /// Taille du tableau différente de celle du template
    #[error("Array size mismatch: expected {expected} pixels, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl RasterError {
    /// Crée une erreur de raster malformé avec contexte
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
