//! Configuration du pipeline
//!
//! Priorité (le dernier l'emporte): valeurs par défaut → fichier JSON →
//! variables d'environnement `DEMCOV_*` → options de la CLI.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Nom du masque intermédiaire dans le dossier de travail
pub const MASK_FILE_NAME: &str = "boundary_mask.tif";

/// Politique de sélection des géométries d'un fichier candidat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidatePolicy {
    /// Toutes les features sont testées, les résidus sont combinés (défaut)
    #[default]
    Aggregate,
    /// Exactement une géométrie attendue, sinon erreur
    Single,
}

impl FromStr for CandidatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aggregate" | "all" | "union" => Ok(Self::Aggregate),
            "single" | "one" => Ok(Self::Single),
            _ => Err(format!("Invalid candidate policy: {}. Use: aggregate, single", s)),
        }
    }
}

/// Moteur de reprojection des contours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReprojectBackend {
    /// Sous-processus `ogr2ogr` (défaut)
    #[default]
    Ogr2ogr,
    /// Reprojection en mémoire avec PROJ (feature `reproject`)
    Proj,
}

impl FromStr for ReprojectBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ogr2ogr" | "ogr" | "gdal" => Ok(Self::Ogr2ogr),
            "proj" | "inprocess" => Ok(Self::Proj),
            _ => Err(format!("Invalid reprojection backend: {}. Use: ogr2ogr, proj", s)),
        }
    }
}

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Dossier où chercher les MNT (*.tif) et les fichiers candidats (*.geojson)
    pub input_dir: PathBuf,

    /// Dossier de travail pour les fichiers intermédiaires
    pub work_dir: PathBuf,

    /// Borne d'altitude: les valeurs hors `]-limit, limit[` deviennent NoData
    pub elevation_limit: f64,

    /// Intervalle passé au moteur de contours
    pub contour_interval: f64,

    /// Tolérance de simplification (None = pas de simplification)
    pub simplify_tolerance: Option<f64>,

    /// SRS cible des contours
    pub target_crs: String,

    /// Nom du contour de couverture (préfixe des fichiers générés)
    pub boundary_name: String,

    /// Préfixe des fichiers de résidu écrits à côté des candidats
    pub output_prefix: String,

    /// Aire minimale d'un polygone de contour (0 = aucun filtrage)
    pub min_area: f64,

    /// Politique pour les fichiers candidats à plusieurs features
    pub candidate_policy: CandidatePolicy,

    /// Moteur de reprojection
    pub reprojection: ReprojectBackend,

    /// Exécutable gdal_contour
    pub gdal_contour_bin: String,

    /// Exécutable ogr2ogr
    pub ogr2ogr_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            work_dir: PathBuf::from("./generated"),
            elevation_limit: demraster::ELEVATION_LIMIT_M,
            contour_interval: 10.0,
            simplify_tolerance: Some(0.75),
            target_crs: "EPSG:4326".to_string(),
            boundary_name: "boundary".to_string(),
            output_prefix: "new_".to_string(),
            min_area: 0.0,
            candidate_policy: CandidatePolicy::Aggregate,
            reprojection: ReprojectBackend::Ogr2ogr,
            gdal_contour_bin: "gdal_contour".to_string(),
            ogr2ogr_bin: "ogr2ogr".to_string(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Applique les variables d'environnement `DEMCOV_*`
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Applique des surcharges depuis une source clé/valeur
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DEMCOV_INPUT_DIR") {
            self.input_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DEMCOV_WORK_DIR") {
            self.work_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DEMCOV_ELEVATION_LIMIT") {
            self.elevation_limit = parse_number("DEMCOV_ELEVATION_LIMIT", &v)?;
        }
        if let Some(v) = lookup("DEMCOV_CONTOUR_INTERVAL") {
            self.contour_interval = parse_number("DEMCOV_CONTOUR_INTERVAL", &v)?;
        }
        if let Some(v) = lookup("DEMCOV_SIMPLIFY") {
            self.simplify_tolerance = match v.to_lowercase().as_str() {
                "" | "none" | "off" => None,
                _ => Some(parse_number("DEMCOV_SIMPLIFY", &v)?),
            };
        }
        if let Some(v) = lookup("DEMCOV_MIN_AREA") {
            self.min_area = parse_number("DEMCOV_MIN_AREA", &v)?;
        }
        if let Some(v) = lookup("DEMCOV_POLICY") {
            self.candidate_policy = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = lookup("DEMCOV_BACKEND") {
            self.reprojection = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = lookup("DEMCOV_GDAL_CONTOUR") {
            self.gdal_contour_bin = v;
        }
        if let Some(v) = lookup("DEMCOV_OGR2OGR") {
            self.ogr2ogr_bin = v;
        }
        Ok(())
    }

    /// Vérifie la cohérence des paramètres
    pub fn validate(&self) -> Result<()> {
        if !(self.elevation_limit > 0.0) {
            bail!("elevation_limit must be positive, got {}", self.elevation_limit);
        }
        if !(self.contour_interval > 0.0) {
            bail!("contour_interval must be positive, got {}", self.contour_interval);
        }
        if let Some(tolerance) = self.simplify_tolerance {
            if !(tolerance >= 0.0) {
                bail!("simplify_tolerance must be >= 0, got {}", tolerance);
            }
        }
        if !(self.min_area >= 0.0) {
            bail!("min_area must be >= 0, got {}", self.min_area);
        }
        if self.boundary_name.is_empty() {
            bail!("boundary_name must not be empty");
        }
        if self.output_prefix.is_empty() {
            bail!("output_prefix must not be empty (outputs would overwrite their inputs)");
        }
        Ok(())
    }

    /// Chemin du masque intermédiaire
    pub fn mask_path(&self) -> PathBuf {
        self.work_dir.join(MASK_FILE_NAME)
    }

    /// Contour brut (SRS natif du MNT)
    pub fn contour_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(format!("{}_countour.geojson", name))
    }

    /// Contour reprojeté et simplifié
    pub fn contour_wgs_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(format!("{}_countour_wgs.geojson", name))
    }

    /// Collection finale de polygones
    pub fn final_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(format!("{}_final.geojson", name))
    }

    /// Fichier de couverture utilisé par le rapport
    pub fn boundary_path(&self) -> PathBuf {
        self.final_path(&self.boundary_name)
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid number for {}: {}", key, value))
}
