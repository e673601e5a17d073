//! Définition et implémentation des commandes CLI
//!
//! - `run` (défaut): contour du MNT puis rapport des candidats
//! - `boundary`: contour seul
//! - `report`: rapport contre un contour existant

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use dem_coverage::config::{CandidatePolicy, Config, ReprojectBackend};
use dem_coverage::engine::{contour_engine, reprojection_engine};
use dem_coverage::{Pipeline, RunReport};

#[derive(Subcommand)]
pub enum Commands {
    /// Derive the DEM boundary, then report candidates outside it (default)
    Run(RunArgs),

    /// Derive the DEM boundary only
    Boundary(RunArgs),

    /// Report candidates against an existing boundary file
    Report(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// DEM to process (default: the single *.tif of the input directory)
    #[arg(long)]
    pub dem: Option<PathBuf>,

    /// Directory holding the DEM and candidate *.geojson files
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory for intermediate and boundary files (default: ./generated)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Simplification tolerance, in source CRS units (default: 0.75)
    #[arg(long, conflicts_with = "no_simplify")]
    pub simplify: Option<f64>,

    /// Disable contour simplification
    #[arg(long)]
    pub no_simplify: bool,

    /// Contour interval (default: 10)
    #[arg(long)]
    pub interval: Option<f64>,

    /// Drop boundary polygons smaller than this area (default: 0, keep all)
    #[arg(long)]
    pub min_area: Option<f64>,

    /// Candidate policy: aggregate, single
    #[arg(long)]
    pub policy: Option<CandidatePolicy>,

    /// Reprojection backend: ogr2ogr, proj
    #[arg(long)]
    pub backend: Option<ReprojectBackend>,

    /// Save the run report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Configuration effective: défauts → fichier → environnement → CLI
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        config.apply_env()?;
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(dir) = &self.work_dir {
            config.work_dir = dir.clone();
        }
        if let Some(tolerance) = self.simplify {
            config.simplify_tolerance = Some(tolerance);
        }
        if self.no_simplify {
            config.simplify_tolerance = None;
        }
        if let Some(interval) = self.interval {
            config.contour_interval = interval;
        }
        if let Some(min_area) = self.min_area {
            config.min_area = min_area;
        }
        if let Some(policy) = self.policy {
            config.candidate_policy = policy;
        }
        if let Some(backend) = self.backend {
            config.reprojection = backend;
        }
    }
}

/// Étapes exécutées par une commande
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    All,
    Boundary,
    Report,
}

/// Exécute une commande et affiche le rapport
pub fn cmd_run(args: &RunArgs, stage: Stage) -> Result<()> {
    let config = args.resolve_config()?;
    info!(
        input_dir = %config.input_dir.display(),
        work_dir = %config.work_dir.display(),
        stage = ?stage,
        "Starting"
    );

    let start = Instant::now();
    let mut report = RunReport::new();
    let result = execute(&config, args.dem.as_deref(), stage, &mut report);

    report.set_duration(start.elapsed());
    if let Err(e) = &result {
        report.fail(e);
    }
    report.display();
    info!("{}", report.summary());

    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    result
}

fn execute(config: &Config, dem: Option<&Path>, stage: Stage, report: &mut RunReport) -> Result<()> {
    let contour = contour_engine(config);
    let reprojection = reprojection_engine(config)?;
    let pipeline = Pipeline::new(config, &contour, reprojection.as_ref());

    match stage {
        Stage::All => pipeline.run(dem, report),
        Stage::Boundary => pipeline.derive_boundary(dem, report).map(|_| ()),
        Stage::Report => pipeline.report_coverage(&config.boundary_path(), report),
    }
}
