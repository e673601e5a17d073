//! Extraction du contour de couverture à partir d'un masque raster
//!
//! 1. contours du masque (niveau 0 entre +1 et -1) dans le SRS natif
//! 2. reprojection vers le SRS cible, avec simplification optionnelle
//! 3. chaque anneau devient un polygone sans trou, numéroté "1", "2", ...
//! 4. écriture de `<name>_final.geojson`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::{Area, Coord, Geometry, LineString, Polygon};
use geojson::GeoJson;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{ContourEngine, ContourRequest, ReprojectRequest, ReprojectionEngine};
use crate::export::export_boundary;
use crate::PipelineError;

/// Un polygone de couverture
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    /// Libellé séquentiel ("1", "2", ...)
    pub name: String,

    /// Anneau extérieur uniquement
    pub polygon: Polygon,

    /// Aire dans le SRS cible
    pub area: f64,
}

/// Résultat d'une extraction
#[derive(Debug, Clone)]
pub struct ExtractedBoundary {
    /// Fichier `<name>_final.geojson`
    pub path: PathBuf,

    /// Polygones écrits
    pub features: Vec<BoundaryFeature>,
}

/// Orchestration des moteurs de contours et de reprojection
pub struct ContourExtractor<'a> {
    config: &'a Config,
    contour: &'a dyn ContourEngine,
    reprojection: &'a dyn ReprojectionEngine,
}

impl<'a> ContourExtractor<'a> {
    pub fn new(
        config: &'a Config,
        contour: &'a dyn ContourEngine,
        reprojection: &'a dyn ReprojectionEngine,
    ) -> Self {
        Self {
            config,
            contour,
            reprojection,
        }
    }

    /// Extrait le contour d'un masque et écrit `<name>_final.geojson`
    ///
    /// `source_crs` est le SRS du masque (WKT) quand il est connu.
    pub fn extract(
        &self,
        name: &str,
        mask: &Path,
        source_crs: Option<&str>,
        simplify: Option<f64>,
    ) -> Result<ExtractedBoundary> {
        std::fs::create_dir_all(&self.config.work_dir).with_context(|| {
            format!(
                "Failed to create work directory {}",
                self.config.work_dir.display()
            )
        })?;

        let contour_file = self.config.contour_path(name);
        let contour_wgs_file = self.config.contour_wgs_path(name);
        let final_file = self.config.final_path(name);

        // Les pilotes GeoJSON refusent d'écraser un fichier existant, et un
        // contour final d'un autre MNT ne doit pas survivre à un échec
        remove_stale(&contour_file)?;
        remove_stale(&contour_wgs_file)?;
        remove_stale(&final_file)?;

        info!(
            engine = self.contour.name(),
            mask = %mask.display(),
            interval = self.config.contour_interval,
            "Tracing contours"
        );
        self.contour
            .contour(&ContourRequest {
                mask,
                output: &contour_file,
                interval: self.config.contour_interval,
            })
            .with_context(|| format!("Contour extraction failed for {}", mask.display()))?;

        info!(
            engine = self.reprojection.name(),
            target = %self.config.target_crs,
            simplify = ?simplify,
            "Reprojecting contours"
        );
        self.reprojection
            .reproject(&ReprojectRequest {
                input: &contour_file,
                output: &contour_wgs_file,
                target_crs: &self.config.target_crs,
                source_crs,
                simplify,
            })
            .with_context(|| format!("Reprojection failed for {}", contour_file.display()))?;

        let geometries = read_geometries(&contour_wgs_file)?;
        let features = build_features(&geometries, self.config.min_area);

        export_boundary(&features, &final_file)?;
        info!(
            path = %final_file.display(),
            features = features.len(),
            "Boundary written"
        );

        Ok(ExtractedBoundary {
            path: final_file,
            features,
        })
    }
}

/// Transforme les géométries de contour en polygones numérotés
///
/// Les trous sont ignorés: seul l'anneau extérieur de chaque polygone est
/// conservé. `min_area` > 0 écarte les petits artefacts.
pub fn build_features(geometries: &[Geometry], min_area: f64) -> Vec<BoundaryFeature> {
    let mut features = Vec::new();

    for ring in geometries.iter().flat_map(outer_rings) {
        let Some(polygon) = ring_to_polygon(ring) else {
            debug!("Skipping degenerate contour ring");
            continue;
        };

        let area = polygon.unsigned_area();
        if area < min_area {
            debug!(area, min_area, "Skipping contour below minimum area");
            continue;
        }

        let name = (features.len() + 1).to_string();
        debug!(name = %name, area, "Boundary polygon");
        features.push(BoundaryFeature {
            name,
            polygon,
            area,
        });
    }

    features
}

/// Anneaux extérieurs d'une géométrie de contour
fn outer_rings(geometry: &Geometry) -> Vec<LineString> {
    match geometry {
        Geometry::LineString(ls) => vec![ls.clone()],
        Geometry::MultiLineString(mls) => mls.0.clone(),
        Geometry::Polygon(p) => vec![p.exterior().clone()],
        Geometry::MultiPolygon(mp) => mp.0.iter().map(|p| p.exterior().clone()).collect(),
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(outer_rings).collect(),
        _ => Vec::new(),
    }
}

/// Ferme l'anneau si besoin; None s'il a moins de 3 sommets distincts
fn ring_to_polygon(ring: LineString) -> Option<Polygon> {
    let mut distinct: Vec<Coord> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        if !distinct.contains(c) {
            distinct.push(*c);
        }
        if distinct.len() >= 3 {
            break;
        }
    }
    if distinct.len() < 3 {
        return None;
    }

    // Polygon::new ferme l'anneau extérieur
    Some(Polygon::new(ring, Vec::new()))
}

/// Charge les géométries d'une FeatureCollection
fn read_geometries(path: &Path) -> Result<Vec<Geometry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let collection = match content.parse::<GeoJson>() {
        Ok(GeoJson::FeatureCollection(fc)) => fc,
        Ok(_) => {
            return Err(PipelineError::invalid_input(path, "expected a FeatureCollection").into())
        }
        Err(e) => return Err(PipelineError::invalid_input(path, e.to_string()).into()),
    };

    let mut geometries = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            warn!(path = %path.display(), "Contour feature without geometry");
            continue;
        };
        let geometry = Geometry::<f64>::try_from(geometry)
            .map_err(|e| PipelineError::invalid_input(path, e.to_string()))?;
        geometries.push(geometry);
    }

    Ok(geometries)
}

fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed stale output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
