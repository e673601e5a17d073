//! Construction du masque de couverture d'un MNT et dérivation du contour

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::contour::{ContourExtractor, ExtractedBoundary};
use crate::PipelineError;

/// Résultat de la dérivation du contour
#[derive(Debug, Clone)]
pub struct BoundaryOutput {
    /// MNT source
    pub dem: PathBuf,

    /// Masque écrit dans le dossier de travail
    pub mask: PathBuf,

    /// Contour final
    pub extracted: ExtractedBoundary,

    /// Pixels valides (+1)
    pub covered_pixels: usize,

    /// Nombre total de pixels
    pub total_pixels: usize,
}

/// Construit le masque +1/-1 d'un MNT puis en extrait le contour
pub fn derive_boundary(
    config: &Config,
    extractor: &ContourExtractor<'_>,
    dem: &Path,
) -> Result<BoundaryOutput> {
    std::fs::create_dir_all(&config.work_dir).with_context(|| {
        format!(
            "Failed to create work directory {}",
            config.work_dir.display()
        )
    })?;

    info!(dem = %dem.display(), "Reading DEM");
    let raster =
        demraster::read(dem).map_err(|e| PipelineError::invalid_input(dem, e.to_string()))?;

    let mask = demraster::coverage_mask(&raster, config.elevation_limit);
    let covered_pixels = demraster::covered_pixels(&mask);
    if let Some(issue) = coverage_issue(covered_pixels, raster.len()) {
        warn!(dem = %dem.display(), "{}", issue);
    }
    info!(
        width = raster.width,
        height = raster.height,
        covered = covered_pixels,
        "Coverage mask built"
    );

    // -1 doit être représentable
    let pixel_type = raster.pixel_type.signed();
    if pixel_type != raster.pixel_type {
        debug!(from = %raster.pixel_type, to = %pixel_type, "Mask promoted to a signed type");
    }
    let mask_path = config.mask_path();
    demraster::write_as(&raster, &mask, &mask_path, None, pixel_type)
        .with_context(|| format!("Failed to write mask {}", mask_path.display()))?;

    let source_crs = Some(raster.projection.as_str()).filter(|wkt| !wkt.is_empty());
    let extracted = extractor.extract(
        &config.boundary_name,
        &mask_path,
        source_crs,
        config.simplify_tolerance,
    )?;

    Ok(BoundaryOutput {
        dem: dem.to_path_buf(),
        mask: mask_path,
        extracted,
        covered_pixels,
        total_pixels: raster.len(),
    })
}

/// Masques sans frontière: aucun contour ne peut être tracé
fn coverage_issue(covered: usize, total: usize) -> Option<&'static str> {
    if covered == 0 {
        Some("DEM has no valid elevation pixel")
    } else if covered == total {
        Some("DEM has no NoData pixel, the mask has no edge to trace")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_issue() {
        assert_eq!(coverage_issue(0, 12), Some("DEM has no valid elevation pixel"));
        assert!(coverage_issue(12, 12).unwrap().contains("no NoData pixel"));
        assert_eq!(coverage_issue(8, 12), None);
    }
}
