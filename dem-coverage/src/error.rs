//! Catégories d'erreurs du pipeline

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Erreurs métier du pipeline (récupérables via `anyhow::Error::downcast_ref`)
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fichier d'entrée absent, illisible ou malformé
    #[error("Invalid input {}: {reason}", path.display())]
    InvalidInput { path: PathBuf, reason: String },

    /// Aucun ou plusieurs MNT candidats
    #[error("DEM selection failed: {0}")]
    DemSelection(String),

    /// Résultat géométrique inexploitable
    #[error("Geometry error in {}: {reason}", path.display())]
    Geometry { path: PathBuf, reason: String },
}

impl PipelineError {
    /// Crée une erreur d'entrée invalide avec contexte
    pub fn invalid_input(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie avec contexte
    pub fn geometry(path: &Path, reason: impl Into<String>) -> Self {
        Self::Geometry {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
