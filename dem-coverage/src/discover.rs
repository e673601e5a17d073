//! Découverte des fichiers d'entrée (MNT et candidats)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::MatchOptions;
use tracing::debug;

use crate::config::Config;
use crate::PipelineError;

/// Fichiers `*.<extension>` d'un dossier, triés, extension insensible à la casse
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        extension
    );
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(&pattern, options)
        .with_context(|| format!("Invalid search pattern: {}", pattern))?
    {
        let path = entry.with_context(|| format!("Cannot read {}", dir.display()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Choisit le MNT à traiter
///
/// Un chemin explicite est utilisé tel quel. Sinon le dossier d'entrée doit
/// contenir exactement un `*.tif`.
pub fn select_dem(config: &Config, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(PipelineError::invalid_input(path, "DEM file not found").into());
        }
        return Ok(path.to_path_buf());
    }

    let mut candidates = files_with_extension(&config.input_dir, "tif")?;
    let mask = canonical(&config.mask_path());
    candidates.retain(|p| canonical(p) != mask);

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(PipelineError::DemSelection(format!(
            "no *.tif found in {}",
            config.input_dir.display()
        ))
        .into()),
        _ => Err(PipelineError::DemSelection(format!(
            "{} DEM files found in {} ({}); pass --dem to choose one",
            candidates.len(),
            config.input_dir.display(),
            list(&candidates)
        ))
        .into()),
    }
}

/// Fichiers `*.geojson` à comparer à la couverture
///
/// Sont exclus: les résidus déjà produits (préfixe de sortie) et les fichiers
/// générés par l'extraction du contour, quand le dossier de travail est le
/// dossier d'entrée.
pub fn candidate_files(config: &Config) -> Result<Vec<PathBuf>> {
    let generated: Vec<PathBuf> = [
        config.boundary_path(),
        config.contour_path(&config.boundary_name),
        config.contour_wgs_path(&config.boundary_name),
    ]
    .iter()
    .map(|p| canonical(p))
    .collect();

    let mut candidates = Vec::new();
    for path in files_with_extension(&config.input_dir, "geojson")? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if name.starts_with(&config.output_prefix) {
            debug!(path = %path.display(), "Skipping previous output");
            continue;
        }

        if generated.contains(&canonical(&path)) {
            debug!(path = %path.display(), "Skipping generated file");
            continue;
        }

        candidates.push(path);
    }

    Ok(candidates)
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
