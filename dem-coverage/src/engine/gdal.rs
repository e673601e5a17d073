//! Moteurs GDAL en sous-processus: gdal_contour et ogr2ogr

use super::command;
use super::{ContourEngine, ContourRequest, EngineError, ReprojectRequest, ReprojectionEngine};

/// `gdal_contour -i <interval> -f GeoJSON <mask> <output>`
#[derive(Debug, Clone)]
pub struct GdalContour {
    program: String,
}

impl GdalContour {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Arguments passés à gdal_contour
    pub fn args(request: &ContourRequest<'_>) -> Vec<String> {
        vec![
            "-i".to_string(),
            request.interval.to_string(),
            "-f".to_string(),
            "GeoJSON".to_string(),
            request.mask.display().to_string(),
            request.output.display().to_string(),
        ]
    }
}

impl ContourEngine for GdalContour {
    fn name(&self) -> &str {
        "gdal_contour"
    }

    fn contour(&self, request: &ContourRequest<'_>) -> Result<(), EngineError> {
        command::run(&self.program, &Self::args(request))
    }
}

/// `ogr2ogr -f GeoJSON -t_srs <crs> <output> <input> [-simplify <tol>]`
#[derive(Debug, Clone)]
pub struct Ogr2Ogr {
    program: String,
}

impl Ogr2Ogr {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Arguments passés à ogr2ogr
    pub fn args(request: &ReprojectRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "GeoJSON".to_string(),
            "-t_srs".to_string(),
            request.target_crs.to_string(),
            request.output.display().to_string(),
            request.input.display().to_string(),
        ];
        // 0 = pas de simplification
        if let Some(tolerance) = request.simplify.filter(|t| *t > 0.0) {
            args.push("-simplify".to_string());
            args.push(tolerance.to_string());
        }
        args
    }
}

impl ReprojectionEngine for Ogr2Ogr {
    fn name(&self) -> &str {
        "ogr2ogr"
    }

    fn reproject(&self, request: &ReprojectRequest<'_>) -> Result<(), EngineError> {
        command::run(&self.program, &Self::args(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_gdal_contour_args() {
        let request = ContourRequest {
            mask: Path::new("generated/boundary_mask.tif"),
            output: Path::new("generated/boundary_countour.geojson"),
            interval: 10.0,
        };
        assert_eq!(
            GdalContour::args(&request),
            vec![
                "-i",
                "10",
                "-f",
                "GeoJSON",
                "generated/boundary_mask.tif",
                "generated/boundary_countour.geojson"
            ]
        );
    }

    #[test]
    fn test_ogr2ogr_args_with_simplify() {
        let request = ReprojectRequest {
            input: Path::new("in.geojson"),
            output: Path::new("out.geojson"),
            target_crs: "EPSG:4326",
            source_crs: None,
            simplify: Some(0.75),
        };
        assert_eq!(
            Ogr2Ogr::args(&request),
            vec![
                "-f",
                "GeoJSON",
                "-t_srs",
                "EPSG:4326",
                "out.geojson",
                "in.geojson",
                "-simplify",
                "0.75"
            ]
        );
    }

    #[test]
    fn test_ogr2ogr_args_without_simplify() {
        let request = ReprojectRequest {
            input: Path::new("in.geojson"),
            output: Path::new("out.geojson"),
            target_crs: "EPSG:4326",
            source_crs: None,
            simplify: None,
        };
        let args = Ogr2Ogr::args(&request);
        assert_eq!(args.len(), 6);
        assert!(!args.contains(&"-simplify".to_string()));
    }

    #[test]
    fn test_ogr2ogr_args_zero_tolerance() {
        let request = ReprojectRequest {
            input: Path::new("in.geojson"),
            output: Path::new("out.geojson"),
            target_crs: "EPSG:4326",
            source_crs: None,
            simplify: Some(0.0),
        };
        let args = Ogr2Ogr::args(&request);
        assert!(!args.contains(&"-simplify".to_string()));
    }
}
