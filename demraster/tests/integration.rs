//! Tests d'intégration GDAL: écriture puis relecture de GeoTIFF

use std::path::PathBuf;

use demraster::{coverage_mask, PixelType, Raster, RasterError, ELEVATION_LIMIT_M};

const WGS84_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#;

/// Dossier temporaire propre au test
fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("demraster_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn template(pixel_type: PixelType) -> Raster {
    Raster {
        width: 4,
        height: 3,
        data: vec![
            -9999.0, 101.0, 102.0, 103.0, //
            110.0, 111.0, -9999.0, 113.0, //
            120.0, 121.0, 122.0, -9999.0,
        ],
        geo_transform: [2.0, 0.5, 0.0, 48.0, 0.0, -0.25],
        projection: WGS84_WKT.to_string(),
        no_data: Some(-9999.0),
        pixel_type,
    }
}

#[test]
fn test_write_read_roundtrip() {
    let dir = temp_dir("roundtrip");
    let path = dir.join("dem.tif");
    let source = template(PixelType::Float32);

    demraster::write(&source, &source.data, &path, None).unwrap();
    let reloaded = demraster::read(&path).unwrap();

    assert_eq!(reloaded.width, 4);
    assert_eq!(reloaded.height, 3);
    assert_eq!(reloaded.data, source.data);
    assert_eq!(reloaded.geo_transform, source.geo_transform);
    assert!(reloaded.projection.contains("WGS 84"));
    assert_eq!(reloaded.no_data, Some(-9999.0));
    assert_eq!(reloaded.pixel_type, PixelType::Float32);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_write_no_data_override() {
    let dir = temp_dir("override");
    let path = dir.join("dem.tif");
    let source = template(PixelType::Int16);

    demraster::write(&source, &source.data, &path, Some(10000.0)).unwrap();
    let reloaded = demraster::read(&path).unwrap();

    assert_eq!(reloaded.no_data, Some(10000.0));
    assert_eq!(reloaded.pixel_type, PixelType::Int16);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_mask_written_with_signed_type() {
    let dir = temp_dir("mask");
    let path = dir.join("boundary_mask.tif");
    let mut source = template(PixelType::UInt8);
    source.data = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 7.0, 8.0, 9.0, 10.0, 0.0];
    source.no_data = Some(0.0);

    let mask = coverage_mask(&source, ELEVATION_LIMIT_M);
    demraster::write_as(&source, &mask, &path, None, source.pixel_type.signed()).unwrap();
    let reloaded = demraster::read(&path).unwrap();

    assert_eq!(reloaded.pixel_type, PixelType::Int16);
    assert_eq!(reloaded.data, mask);
    assert!(reloaded.data.iter().all(|&v| v == 1.0 || v == -1.0));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_read_without_band() {
    let dir = temp_dir("no_band");
    let path = dir.join("empty.vrt");
    std::fs::write(
        &path,
        r#"<VRTDataset rasterXSize="2" rasterYSize="2"></VRTDataset>"#,
    )
    .unwrap();

    let err = demraster::read(&path).unwrap_err();
    assert!(matches!(err, RasterError::MissingBand { .. }), "{err}");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_read_complex_band_rejected() {
    let dir = temp_dir("complex");
    let path = dir.join("complex.vrt");
    std::fs::write(
        &path,
        r#"<VRTDataset rasterXSize="2" rasterYSize="2"><VRTRasterBand dataType="CFloat32" band="1"></VRTRasterBand></VRTDataset>"#,
    )
    .unwrap();

    let err = demraster::read(&path).unwrap_err();
    assert!(
        matches!(err, RasterError::UnsupportedDataType { .. }),
        "{err}"
    );

    std::fs::remove_dir_all(dir).ok();
}
