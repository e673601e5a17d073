//! Différence entre fichiers candidats et couverture du MNT
//!
//! Pour chaque candidat, la partie située hors de l'union des polygones de
//! couverture est écrite en GeoJSON brut dans `<prefix><nom du fichier>`. Un
//! résidu vide ne produit aucun fichier.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CandidatePolicy, Config};
use crate::export::export_geometry;
use crate::geometry;
use crate::PipelineError;

/// Issue du traitement d'un candidat
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CandidateOutcome {
    /// Entièrement couvert par le MNT, aucun fichier écrit
    Covered,
    /// Une partie est hors couverture
    Residual { output: PathBuf },
}

/// Comparaison des candidats à la couverture
pub struct CoverageReporter<'a> {
    config: &'a Config,
}

impl<'a> CoverageReporter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Union de tous les polygones du fichier de couverture
    pub fn load_coverage(&self, boundary: &Path) -> Result<MultiPolygon> {
        if !boundary.is_file() {
            return Err(PipelineError::invalid_input(boundary, "boundary file not found").into());
        }

        let polygons: Vec<_> = read_geometries(boundary)?
            .iter()
            .flat_map(geometry::polygons_of)
            .collect();
        if polygons.is_empty() {
            return Err(PipelineError::geometry(boundary, "boundary contains no polygon").into());
        }

        debug!(path = %boundary.display(), polygons = polygons.len(), "Coverage loaded");
        Ok(geometry::union_all(polygons))
    }

    /// Géométries d'un candidat selon la politique configurée
    pub fn read_candidate(&self, path: &Path) -> Result<Vec<Geometry>> {
        let geometries = read_geometries(path)?;

        match self.config.candidate_policy {
            CandidatePolicy::Aggregate if geometries.is_empty() => {
                Err(PipelineError::invalid_input(path, "no geometry found").into())
            }
            CandidatePolicy::Aggregate => Ok(geometries),
            CandidatePolicy::Single if geometries.len() == 1 => Ok(geometries),
            CandidatePolicy::Single => Err(PipelineError::invalid_input(
                path,
                format!("expected exactly one geometry, found {}", geometries.len()),
            )
            .into()),
        }
    }

    /// Calcule et écrit le résidu d'un candidat
    pub fn report(&self, candidate: &Path, coverage: &MultiPolygon) -> Result<CandidateOutcome> {
        let residuals = self
            .read_candidate(candidate)?
            .iter()
            .map(|g| geometry::difference(g, coverage))
            .collect();
        let residual = geometry::combine(residuals);

        if geometry::is_empty(&residual) {
            info!(candidate = %candidate.display(), "No intersection, candidate is fully covered");
            return Ok(CandidateOutcome::Covered);
        }

        let output = self.output_path(candidate)?;
        export_geometry(&residual, &output)?;
        info!(
            candidate = %candidate.display(),
            output = %output.display(),
            "Residual written"
        );

        Ok(CandidateOutcome::Residual { output })
    }

    /// `<input_dir>/<prefix><nom du fichier>`
    pub fn output_path(&self, candidate: &Path) -> Result<PathBuf> {
        let name = candidate
            .file_name()
            .ok_or_else(|| PipelineError::invalid_input(candidate, "not a file"))?;

        Ok(self.config.input_dir.join(format!(
            "{}{}",
            self.config.output_prefix,
            name.to_string_lossy()
        )))
    }
}

/// Géométries d'un fichier Feature, FeatureCollection ou Geometry
fn read_geometries(path: &Path) -> Result<Vec<Geometry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let geojson = content
        .parse::<GeoJson>()
        .map_err(|e| PipelineError::invalid_input(path, e.to_string()))?;

    let raw = match geojson {
        GeoJson::Geometry(g) => vec![g],
        GeoJson::Feature(f) => match f.geometry {
            Some(g) => vec![g],
            None => return Err(PipelineError::invalid_input(path, "feature without geometry").into()),
        },
        GeoJson::FeatureCollection(fc) => {
            let mut geometries = Vec::with_capacity(fc.features.len());
            for (i, feature) in fc.features.into_iter().enumerate() {
                match feature.geometry {
                    Some(g) => geometries.push(g),
                    None => warn!(path = %path.display(), index = i, "Feature without geometry"),
                }
            }
            geometries
        }
    };

    raw.into_iter()
        .map(|g| {
            Geometry::<f64>::try_from(g)
                .map_err(|e| anyhow::Error::from(PipelineError::invalid_input(path, e.to_string())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    const TWO_SQUARES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"name":"1"},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
        {"type":"Feature","properties":{"name":"2"},"geometry":{"type":"Polygon","coordinates":[[[2,2],[3,2],[3,3],[2,3],[2,2]]]}}
    ]}"#;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("demcov_coverage_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config_for(dir: &Path) -> Config {
        Config {
            input_dir: dir.to_path_buf(),
            work_dir: dir.join("generated"),
            ..Config::default()
        }
    }

    #[test]
    fn test_contained_candidate_writes_nothing() {
        let dir = temp_dir("contained");
        let config = config_for(&dir);
        let boundary = dir.join("boundary.geojson");
        std::fs::write(&boundary, TWO_SQUARES).unwrap();
        let candidate = dir.join("square.geojson");
        std::fs::write(
            &candidate,
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}"#,
        )
        .unwrap();

        let reporter = CoverageReporter::new(&config);
        let coverage = reporter.load_coverage(&boundary).unwrap();
        let outcome = reporter.report(&candidate, &coverage).unwrap();

        assert_eq!(outcome, CandidateOutcome::Covered);
        assert!(!dir.join("new_square.geojson").exists());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_half_covered_candidate() {
        let dir = temp_dir("half");
        let config = config_for(&dir);
        let boundary = dir.join("boundary.geojson");
        std::fs::write(
            &boundary,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"name":"1"},"geometry":{"type":"Polygon","coordinates":[[[0.5,0],[1.5,0],[1.5,1],[0.5,1],[0.5,0]]]}}]}"#,
        )
        .unwrap();
        let candidate = dir.join("parcel.geojson");
        std::fs::write(
            &candidate,
            r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#,
        )
        .unwrap();

        let reporter = CoverageReporter::new(&config);
        let coverage = reporter.load_coverage(&boundary).unwrap();
        let outcome = reporter.report(&candidate, &coverage).unwrap();

        let output = dir.join("new_parcel.geojson");
        assert_eq!(outcome, CandidateOutcome::Residual { output: output.clone() });

        // Géométrie brute, pas de Feature autour
        let content = std::fs::read_to_string(&output).unwrap();
        let GeoJson::Geometry(written) = content.parse::<GeoJson>().unwrap() else {
            panic!("Expected a raw geometry");
        };
        let residual = Geometry::<f64>::try_from(written).unwrap();
        assert!(matches!(residual, Geometry::Polygon(_)));
        assert!((residual.unsigned_area() - 0.5).abs() < 1e-9);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_aggregate_policy_combines_features() {
        let dir = temp_dir("aggregate");
        let config = config_for(&dir);
        let boundary = dir.join("boundary.geojson");
        std::fs::write(&boundary, TWO_SQUARES).unwrap();
        let candidate = dir.join("sites.geojson");
        std::fs::write(
            &candidate,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0.5,0.5]}},
                {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[5,5]}},
                {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[2.5,2.5]}}
            ]}"#,
        )
        .unwrap();

        let reporter = CoverageReporter::new(&config);
        let coverage = reporter.load_coverage(&boundary).unwrap();
        reporter.report(&candidate, &coverage).unwrap();

        let content = std::fs::read_to_string(dir.join("new_sites.geojson")).unwrap();
        let GeoJson::Geometry(written) = content.parse::<GeoJson>().unwrap() else {
            panic!("Expected a raw geometry");
        };
        // Seul le point (5, 5) est hors couverture
        assert_eq!(
            Geometry::<f64>::try_from(written).unwrap(),
            Geometry::Point(geo::Point::new(5.0, 5.0))
        );

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_single_policy_rejects_collections() {
        let dir = temp_dir("single");
        let mut config = config_for(&dir);
        config.candidate_policy = CandidatePolicy::Single;
        let candidate = dir.join("two.geojson");
        std::fs::write(&candidate, TWO_SQUARES).unwrap();

        let reporter = CoverageReporter::new(&config);
        let err = reporter.read_candidate(&candidate).unwrap_err();
        assert!(err.to_string().contains("exactly one geometry"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_boundary_is_invalid_input() {
        let dir = temp_dir("missing");
        let config = config_for(&dir);

        let err = CoverageReporter::new(&config)
            .load_coverage(&dir.join("nope.geojson"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidInput { .. })
        ));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_malformed_candidate_names_file() {
        let dir = temp_dir("malformed");
        let config = config_for(&dir);
        let candidate = dir.join("broken.geojson");
        std::fs::write(&candidate, "{ not json").unwrap();

        let err = CoverageReporter::new(&config)
            .read_candidate(&candidate)
            .unwrap_err();
        assert!(err.to_string().contains("broken.geojson"));

        std::fs::remove_dir_all(dir).ok();
    }
}
