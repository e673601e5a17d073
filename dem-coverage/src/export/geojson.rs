//! Export vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::Geometry;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use crate::contour::BoundaryFeature;

/// Exporte les polygones de couverture en FeatureCollection
///
/// Chaque feature porte une seule propriété `name` ("1", "2", ...).
pub fn export_boundary(features: &[BoundaryFeature], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    for (i, feature) in features.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(&mut writer, feature)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit une géométrie seule (sans Feature autour)
pub fn export_geometry(geometry: &Geometry, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_geometry(&mut writer, geometry)?;
    writer.flush()?;

    Ok(())
}

/// Écrit une feature de couverture en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &BoundaryFeature) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","geometry":"#)?;
    write_geometry(writer, &Geometry::Polygon(feature.polygon.clone()))?;
    write!(
        writer,
        r#","properties":{{"name":"{}"}}}}"#,
        escape_json(&feature.name)
    )?;

    Ok(())
}

/// Géométrie via geozero
fn write_geometry<W: Write>(writer: &mut W, geometry: &Geometry) -> Result<()> {
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;
    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
