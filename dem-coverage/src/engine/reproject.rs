//! Reprojection en mémoire avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.
//! Il remplace `ogr2ogr` quand les outils GDAL ne sont pas installés.

#[cfg(feature = "reproject")]
use std::path::Path;

#[cfg(feature = "reproject")]
use geo::{
    Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
    Simplify,
};
#[cfg(feature = "reproject")]
use geojson::{FeatureCollection, GeoJson};
#[cfg(feature = "reproject")]
use proj::Proj;
#[cfg(feature = "reproject")]
use tracing::debug;

#[cfg(feature = "reproject")]
use super::{EngineError, ReprojectRequest, ReprojectionEngine};

/// Reprojection de géométries entre deux systèmes de coordonnées
#[cfg(feature = "reproject")]
pub struct Reprojector {
    proj: Proj,
    identity: bool,
}

#[cfg(feature = "reproject")]
impl Reprojector {
    /// Crée un reprojector entre deux définitions de SRS (EPSG:xxxx, WKT, PROJ)
    pub fn new(source: &str, target: &str) -> Result<Self, EngineError> {
        let proj = Proj::new_known_crs(source, target, None).map_err(|e| {
            EngineError::Reproject(format!(
                "Failed to create projection from {} to {}: {}",
                short_crs(source),
                target,
                e
            ))
        })?;

        Ok(Self {
            proj,
            identity: source == target,
        })
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, EngineError> {
        if self.identity {
            return Ok(geom.clone());
        }

        match geom {
            Geometry::Point(p) => {
                let (x, y) = self.transform_coord(p.0)?;
                Ok(Geometry::Point(Point::new(x, y)))
            }
            Geometry::LineString(ls) => Ok(Geometry::LineString(self.transform_linestring(ls)?)),
            Geometry::Polygon(p) => Ok(Geometry::Polygon(self.transform_polygon(p)?)),
            Geometry::MultiPoint(mp) => {
                let points: Result<Vec<Point>, EngineError> =
                    mp.0.iter()
                        .map(|p| {
                            let (x, y) = self.transform_coord(p.0)?;
                            Ok(Point::new(x, y))
                        })
                        .collect();
                Ok(Geometry::MultiPoint(MultiPoint::new(points?)))
            }
            Geometry::MultiLineString(mls) => {
                let lines: Result<Vec<LineString>, EngineError> = mls
                    .0
                    .iter()
                    .map(|ls| self.transform_linestring(ls))
                    .collect();
                Ok(Geometry::MultiLineString(MultiLineString::new(lines?)))
            }
            Geometry::MultiPolygon(mp) => {
                let polys: Result<Vec<Polygon>, EngineError> =
                    mp.0.iter().map(|p| self.transform_polygon(p)).collect();
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polys?)))
            }
            Geometry::GeometryCollection(gc) => {
                let geoms: Result<Vec<Geometry>, EngineError> =
                    gc.0.iter().map(|g| self.transform_geometry(g)).collect();
                Ok(Geometry::GeometryCollection(geo::GeometryCollection(geoms?)))
            }
            // Line, Rect, Triangle: pas produits par les moteurs de contours
            _ => Err(EngineError::Reproject(
                "Unsupported geometry type for reprojection".to_string(),
            )),
        }
    }

    /// Transforme une coordonnée unique
    fn transform_coord(&self, coord: Coord) -> Result<(f64, f64), EngineError> {
        self.proj
            .convert((coord.x, coord.y))
            .map_err(|e| EngineError::Reproject(format!("Coordinate transformation failed: {}", e)))
    }

    /// Transforme une LineString (conversion batch)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString, EngineError> {
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj.convert_array(&mut coords).map_err(|e| {
            EngineError::Reproject(format!("Batch coordinate transformation failed: {}", e))
        })?;

        let result: Vec<Coord> = coords.into_iter().map(|(x, y)| Coord { x, y }).collect();
        Ok(LineString::new(result))
    }

    /// Transforme un Polygon
    fn transform_polygon(&self, p: &Polygon) -> Result<Polygon, EngineError> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors: Result<Vec<LineString>, EngineError> = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect();
        Ok(Polygon::new(exterior, interiors?))
    }
}

/// Équivalent en mémoire de `ogr2ogr -t_srs <crs> [-simplify <tol>]`
///
/// La simplification (Douglas-Peucker) est appliquée en unités du SRS source,
/// avant la reprojection.
#[cfg(feature = "reproject")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjReprojection;

#[cfg(feature = "reproject")]
impl ReprojectionEngine for ProjReprojection {
    fn name(&self) -> &str {
        "proj"
    }

    fn reproject(&self, request: &ReprojectRequest<'_>) -> Result<(), EngineError> {
        let mut collection = read_collection(request.input)?;

        let source = match request.source_crs.filter(|s| !s.trim().is_empty()) {
            Some(crs) => crs.to_string(),
            None => collection_crs(&collection).ok_or_else(|| EngineError::InvalidGeoJson {
                path: request.input.to_path_buf(),
                reason: "no source CRS given and no 'crs' member found".to_string(),
            })?,
        };
        let reprojector = Reprojector::new(&source, request.target_crs)?;

        for feature in &mut collection.features {
            let Some(geometry) = feature.geometry.take() else {
                continue;
            };
            let geom = Geometry::<f64>::try_from(geometry).map_err(|e| {
                EngineError::InvalidGeoJson {
                    path: request.input.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
            let geom = match request.simplify {
                Some(tolerance) if tolerance > 0.0 => simplify(&geom, tolerance),
                _ => geom,
            };
            let geom = reprojector.transform_geometry(&geom)?;
            feature.geometry = Some(geojson::Geometry::new(geojson::Value::from(&geom)));
        }

        // WGS84 est implicite (RFC 7946), les autres SRS sont déclarés
        collection.foreign_members = crs_member(request.target_crs);

        let json = GeoJson::FeatureCollection(collection).to_string();
        std::fs::write(request.output, json)?;

        debug!(
            input = %request.input.display(),
            output = %request.output.display(),
            target = request.target_crs,
            "Collection reprojected"
        );
        Ok(())
    }
}

/// Simplifie les géométries linéaires et surfaciques
#[cfg(feature = "reproject")]
fn simplify(geom: &Geometry, tolerance: f64) -> Geometry {
    match geom {
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify(&tolerance)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(mls.simplify(&tolerance)),
        Geometry::Polygon(p) => Geometry::Polygon(p.simplify(&tolerance)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp.simplify(&tolerance)),
        other => other.clone(),
    }
}

#[cfg(feature = "reproject")]
fn read_collection(path: &Path) -> Result<FeatureCollection, EngineError> {
    let content = std::fs::read_to_string(path)?;
    let invalid = |reason: String| EngineError::InvalidGeoJson {
        path: path.to_path_buf(),
        reason,
    };
    match content.parse::<GeoJson>().map_err(|e| invalid(e.to_string()))? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(invalid("expected a FeatureCollection".to_string())),
    }
}

/// SRS déclaré par le membre `crs` (GeoJSON 2008), ex: `urn:ogc:def:crs:EPSG::32631`
#[cfg(feature = "reproject")]
fn collection_crs(collection: &FeatureCollection) -> Option<String> {
    let name = collection
        .foreign_members
        .as_ref()?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;

    match name.rsplit_once("EPSG::") {
        Some((_, code)) => Some(format!("EPSG:{}", code)),
        None if name == "urn:ogc:def:crs:OGC:1.3:CRS84" => Some("OGC:CRS84".to_string()),
        None => Some(name.to_string()),
    }
}

/// Membre `crs` à écrire pour un SRS cible `EPSG:xxxx` (aucun pour WGS84)
#[cfg(feature = "reproject")]
fn crs_member(target: &str) -> Option<geojson::JsonObject> {
    let code = target.strip_prefix("EPSG:")?;
    if code == "4326" {
        return None;
    }
    let crs = serde_json::json!({
        "type": "name",
        "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", code) }
    });
    let mut members = geojson::JsonObject::new();
    members.insert("crs".to_string(), crs);
    Some(members)
}

/// Version courte d'une définition de SRS pour les messages (les WKT sont longs)
#[cfg(feature = "reproject")]
fn short_crs(definition: &str) -> &str {
    definition.split(',').next().unwrap_or(definition)
}
