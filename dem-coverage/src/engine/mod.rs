//! Moteurs externes: tracé de contours et reprojection
//!
//! Le pipeline ne dépend que des traits [`ContourEngine`] et
//! [`ReprojectionEngine`]; les implémentations GDAL (sous-processus) et PROJ
//! (en mémoire) sont interchangeables, et les tests utilisent des fakes.

pub mod command;
pub mod gdal;
pub mod reproject;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{Config, ReprojectBackend};

pub use self::gdal::{GdalContour, Ogr2Ogr};
#[cfg(feature = "reproject")]
pub use reproject::ProjReprojection;

/// Erreurs des moteurs externes
#[derive(Debug, Error)]
pub enum EngineError {
    /// Exécutable introuvable ou non exécutable
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Code de retour non nul
    #[error("Command `{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Moteur indisponible dans ce build
    #[error("Unsupported engine: {0}")]
    Unsupported(String),

    /// Erreur d'I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GeoJSON illisible
    #[error("Invalid GeoJSON in {}: {reason}", path.display())]
    InvalidGeoJson { path: PathBuf, reason: String },

    /// Erreur de transformation de coordonnées
    #[error("Reprojection failed: {0}")]
    Reproject(String),
}

/// Demande de tracé de contours sur un masque raster
#[derive(Debug, Clone, Copy)]
pub struct ContourRequest<'a> {
    /// Masque raster (+1/-1)
    pub mask: &'a Path,

    /// GeoJSON de sortie (SRS natif du masque)
    pub output: &'a Path,

    /// Intervalle entre deux niveaux
    pub interval: f64,
}

/// Demande de reprojection d'une collection GeoJSON
#[derive(Debug, Clone, Copy)]
pub struct ReprojectRequest<'a> {
    /// GeoJSON source
    pub input: &'a Path,

    /// GeoJSON de sortie
    pub output: &'a Path,

    /// SRS cible (ex: "EPSG:4326")
    pub target_crs: &'a str,

    /// SRS source connu (WKT du masque), sinon lu dans le fichier
    pub source_crs: Option<&'a str>,

    /// Tolérance de simplification, en unités du SRS source
    pub simplify: Option<f64>,
}

/// Tracé de contours (ex: gdal_contour)
pub trait ContourEngine {
    /// Nom court pour les logs
    fn name(&self) -> &str;

    /// Écrit les contours du masque dans `request.output`
    fn contour(&self, request: &ContourRequest<'_>) -> Result<(), EngineError>;
}

/// Reprojection + simplification (ex: ogr2ogr)
pub trait ReprojectionEngine {
    /// Nom court pour les logs
    fn name(&self) -> &str;

    /// Écrit la collection reprojetée dans `request.output`
    fn reproject(&self, request: &ReprojectRequest<'_>) -> Result<(), EngineError>;
}

/// Construit le moteur de contours configuré
pub fn contour_engine(config: &Config) -> GdalContour {
    GdalContour::new(&config.gdal_contour_bin)
}

/// Construit le moteur de reprojection configuré
pub fn reprojection_engine(config: &Config) -> Result<Box<dyn ReprojectionEngine>, EngineError> {
    match config.reprojection {
        ReprojectBackend::Ogr2ogr => Ok(Box::new(Ogr2Ogr::new(&config.ogr2ogr_bin))),
        #[cfg(feature = "reproject")]
        ReprojectBackend::Proj => Ok(Box::new(ProjReprojection)),
        #[cfg(not(feature = "reproject"))]
        ReprojectBackend::Proj => Err(EngineError::Unsupported(
            "the proj backend requires the 'reproject' feature. \
             Build with: cargo build --features reproject"
                .to_string(),
        )),
    }
}
