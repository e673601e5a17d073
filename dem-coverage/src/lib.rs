//! # dem-coverage
//!
//! Contour de couverture d'un MNT et rapport des géométries hors couverture.
//!
//! ## Features
//!
//! - Masque +1/-1 des pixels valides du MNT (NoData normalisé)
//! - Contour via `gdal_contour`, reprojection via `ogr2ogr` ou PROJ
//! - Différence entre fichiers GeoJSON candidats et l'union des polygones
//! - Configuration JSON, variables `DEMCOV_*` et CLI
//!
//! ## Usage CLI
//!
//! ```bash
//! # Run complet: contour du seul *.tif du dossier, puis rapport
//! dem-coverage --input-dir ./data
//!
//! # Contour seul, MNT explicite, reprojection en mémoire
//! dem-coverage boundary --dem ./data/mnt.tif --backend proj
//!
//! # Rapport contre un contour existant
//! dem-coverage report --input-dir ./data --policy single
//! ```

pub mod boundary;
pub mod config;
pub mod contour;
pub mod coverage;
pub mod discover;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod pipeline;
pub mod report;

pub use config::{CandidatePolicy, Config, ReprojectBackend};
pub use coverage::{CandidateOutcome, CoverageReporter};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use report::{RunReport, RunStatus};
