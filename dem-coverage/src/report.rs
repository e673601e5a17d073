//! Rapport d'exécution
//!
//! Collecte le MNT traité, le contour produit et l'issue de chaque candidat,
//! puis l'affiche en fin de run ou le sauvegarde en JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::boundary::BoundaryOutput;
use crate::coverage::CandidateOutcome;

/// Statut global du run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Run terminé
    Success,
    /// Run interrompu par une erreur
    Failed,
}

/// Issue d'un fichier candidat
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: CandidateOutcome,
}

/// Rapport complet d'un run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// MNT source (absent en mode `report`)
    pub dem: Option<PathBuf>,
    /// Fichier de couverture utilisé
    pub boundary: Option<PathBuf>,
    /// Nombre de polygones de couverture
    pub boundary_features: usize,
    /// Pixels valides du MNT
    pub covered_pixels: usize,
    /// Pixels du MNT
    pub total_pixels: usize,

    /// Issue par candidat, dans l'ordre de traitement
    pub candidates: Vec<CandidateReport>,

    /// Durée du run
    pub duration_secs: f64,
    /// Statut global
    pub status: RunStatus,
    /// Erreur fatale (chaîne complète)
    pub error: Option<String>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            dem: None,
            boundary: None,
            boundary_features: 0,
            covered_pixels: 0,
            total_pixels: 0,
            candidates: Vec::new(),
            duration_secs: 0.0,
            status: RunStatus::Success,
            error: None,
        }
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre la dérivation du contour
    pub fn record_boundary(&mut self, output: &BoundaryOutput) {
        self.dem = Some(output.dem.clone());
        self.boundary = Some(output.extracted.path.clone());
        self.boundary_features = output.extracted.features.len();
        self.covered_pixels = output.covered_pixels;
        self.total_pixels = output.total_pixels;
    }

    /// Fichier de couverture fourni sans dérivation
    pub fn set_boundary_file(&mut self, path: &Path) {
        self.boundary = Some(path.to_path_buf());
    }

    /// Enregistre l'issue d'un candidat
    pub fn record_candidate(&mut self, path: &Path, outcome: CandidateOutcome) {
        self.candidates.push(CandidateReport {
            path: path.to_path_buf(),
            outcome,
        });
    }

    /// Définit la durée du run
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Marque le run en échec
    pub fn fail(&mut self, error: &anyhow::Error) {
        self.status = RunStatus::Failed;
        self.error = Some(format!("{:#}", error));
    }

    /// Candidats entièrement couverts
    pub fn covered_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.outcome == CandidateOutcome::Covered)
            .count()
    }

    /// Candidats avec un résidu écrit
    pub fn residual_count(&self) -> usize {
        self.candidates.len() - self.covered_count()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("DEM COVERAGE REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- BOUNDARY ---");
        if let Some(dem) = &self.dem {
            let ratio = if self.total_pixels > 0 {
                100.0 * self.covered_pixels as f64 / self.total_pixels as f64
            } else {
                0.0
            };
            println!("DEM: {}", dem.display());
            println!(
                "Pixels: {} valid / {} ({:.1}%)",
                self.covered_pixels, self.total_pixels, ratio
            );
        }
        match &self.boundary {
            Some(boundary) if self.dem.is_some() => println!(
                "Boundary: {} ({} polygons)",
                boundary.display(),
                self.boundary_features
            ),
            Some(boundary) => println!("Boundary: {}", boundary.display()),
            None => println!("Boundary: -"),
        }

        println!(
            "\n--- CANDIDATES ({}: {} covered, {} with residual) ---",
            self.candidates.len(),
            self.covered_count(),
            self.residual_count()
        );
        for c in self.candidates.iter().take(20) {
            match &c.outcome {
                CandidateOutcome::Covered => println!("  {}: covered", c.path.display()),
                CandidateOutcome::Residual { output } => {
                    println!("  {}: residual -> {}", c.path.display(), output.display())
                }
            }
        }
        if self.candidates.len() > 20 {
            println!("  ... and {} more", self.candidates.len() - 20);
        }

        if let Some(error) = &self.error {
            println!("\n--- ERROR ---");
            println!("  {}", error);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} candidates: {} covered, {} with residual",
            self.candidates.len(),
            self.covered_count(),
            self.residual_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_report_default() {
        let report = RunReport::new();
        assert_eq!(report.status, RunStatus::Success);
        assert!(report.candidates.is_empty());
        assert!(report.error.is_none());
    }

    #[test]
    fn test_record_candidates() {
        let mut report = RunReport::new();
        report.record_candidate(Path::new("a.geojson"), CandidateOutcome::Covered);
        report.record_candidate(
            Path::new("b.geojson"),
            CandidateOutcome::Residual {
                output: PathBuf::from("new_b.geojson"),
            },
        );
        report.record_candidate(Path::new("c.geojson"), CandidateOutcome::Covered);

        assert_eq!(report.covered_count(), 2);
        assert_eq!(report.residual_count(), 1);
        assert_eq!(report.summary(), "3 candidates: 2 covered, 1 with residual");
    }

    #[test]
    fn test_fail_keeps_error_chain() {
        let mut report = RunReport::new();
        let error = anyhow::anyhow!("gdal_contour exited with 1").context("Contour extraction failed");
        report.fail(&error);

        assert_eq!(report.status, RunStatus::Failed);
        let message = report.error.unwrap();
        assert!(message.contains("Contour extraction failed"));
        assert!(message.contains("gdal_contour exited with 1"));
    }

    #[test]
    fn test_serialized_outcomes() {
        let mut report = RunReport::new();
        report.record_candidate(
            Path::new("b.geojson"),
            CandidateOutcome::Residual {
                output: PathBuf::from("new_b.geojson"),
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        let candidate = &json["candidates"][0];
        assert_eq!(candidate["path"], "b.geojson");
        assert_eq!(candidate["outcome"], "residual");
        assert_eq!(candidate["output"], "new_b.geojson");
        assert_eq!(json["status"], "Success");
    }
}
