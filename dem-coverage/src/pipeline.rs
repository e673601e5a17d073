//! Enchaînement complet: masque → contour → différences

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::boundary::{derive_boundary, BoundaryOutput};
use crate::config::Config;
use crate::contour::ContourExtractor;
use crate::coverage::CoverageReporter;
use crate::discover;
use crate::engine::{ContourEngine, ReprojectionEngine};
use crate::report::RunReport;

/// Pipeline d'un run (un MNT, un dossier de candidats)
pub struct Pipeline<'a> {
    config: &'a Config,
    contour: &'a dyn ContourEngine,
    reprojection: &'a dyn ReprojectionEngine,
}

impl<'a> Pipeline<'a> {
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

    /// Sélectionne le MNT et dérive son contour de couverture
    pub fn derive_boundary(
        &self,
        dem: Option<&Path>,
        report: &mut RunReport,
    ) -> Result<BoundaryOutput> {
        let dem = discover::select_dem(self.config, dem)?;
        let extractor = ContourExtractor::new(self.config, self.contour, self.reprojection);

        let output = derive_boundary(self.config, &extractor, &dem)?;
        report.record_boundary(&output);

        Ok(output)
    }

    /// Compare chaque candidat du dossier d'entrée au contour `boundary`
    pub fn report_coverage(&self, boundary: &Path, report: &mut RunReport) -> Result<()> {
        let reporter = CoverageReporter::new(self.config);
        let coverage = reporter.load_coverage(boundary)?;
        report.set_boundary_file(boundary);

        let candidates = discover::candidate_files(self.config)?;
        info!(
            count = candidates.len(),
            input_dir = %self.config.input_dir.display(),
            "Comparing candidates to coverage"
        );

        for candidate in &candidates {
            let outcome = reporter.report(candidate, &coverage)?;
            report.record_candidate(candidate, outcome);
        }

        Ok(())
    }

    /// Run complet
    pub fn run(&self, dem: Option<&Path>, report: &mut RunReport) -> Result<()> {
        let boundary = self.derive_boundary(dem, report)?;
        self.report_coverage(&boundary.extracted.path, report)
    }
}
