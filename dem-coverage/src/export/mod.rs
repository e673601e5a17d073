//! Modules d'export (GeoJSON)

pub mod geojson;

pub use self::geojson::{export_boundary, export_geometry};
