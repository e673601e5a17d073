//! Types de données pour le crate demraster

use std::fmt;

/// Géotransformation GDAL: origine, taille de pixel et rotations
pub type GeoTransform = [f64; 6];

/// Un MNT chargé en mémoire (bande 1 uniquement)
#[derive(Debug, Clone)]
pub struct Raster {
    /// Nombre de colonnes
    pub width: usize,

    /// Nombre de lignes
    pub height: usize,

    /// Valeurs des pixels, ligne par ligne
    pub data: Vec<f64>,

    /// Géotransformation (origine + taille de pixel)
    pub geo_transform: GeoTransform,

    /// Système de coordonnées (WKT), vide si non défini
    pub projection: String,

    /// Valeur NoData déclarée pour la bande 1
    pub no_data: Option<f64>,

    /// Type de pixel de la bande source
    pub pixel_type: PixelType,
}

impl Raster {
    /// Nombre total de pixels
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Types de pixels gérés en lecture/écriture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl PixelType {
    /// Type signé le plus proche, pour écrire des valeurs négatives
    pub fn signed(self) -> Self {
        match self {
            Self::UInt8 => Self::Int16,
            Self::UInt16 | Self::UInt32 => Self::Int32,
            other => other,
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::Int16 => "Int16",
            Self::UInt32 => "UInt32",
            Self::Int32 => "Int32",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        };
        f.write_str(name)
    }
}
