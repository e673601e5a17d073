//! Lecture et écriture GeoTIFF via GDAL

use std::path::Path;

use gdal::cpl::CslStringList;
use gdal::raster::{Buffer, GdalDataType, GdalType};
use gdal::{Dataset, DriverManager};
use tracing::{debug, warn};

use crate::types::{GeoTransform, PixelType, Raster};
use crate::RasterError;

/// Géotransformation identité (pixel = unité de carte)
const IDENTITY_TRANSFORM: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Charge la bande 1 d'un raster en mémoire
///
/// # Errors
///
/// Retourne `RasterError::MissingBand` si le raster n'a aucune bande, et
/// `RasterError::UnsupportedDataType` pour les types de pixels non gérés.
pub fn read(path: &Path) -> Result<Raster, RasterError> {
    let dataset = Dataset::open(path)?;

    if dataset.raster_count() < 1 {
        return Err(RasterError::MissingBand {
            path: path.to_path_buf(),
        });
    }
    let band = dataset
        .rasterband(1)
        .map_err(|_| RasterError::MissingBand {
            path: path.to_path_buf(),
        })?;

    let (width, height) = dataset.raster_size();
    if width == 0 || height == 0 {
        return Err(RasterError::malformed(path, "raster has no pixels"));
    }

    let pixel_type = match band.band_type() {
        GdalDataType::UInt8 => PixelType::UInt8,
        GdalDataType::UInt16 => PixelType::UInt16,
        GdalDataType::Int16 => PixelType::Int16,
        GdalDataType::UInt32 => PixelType::UInt32,
        GdalDataType::Int32 => PixelType::Int32,
        GdalDataType::Float32 => PixelType::Float32,
        GdalDataType::Float64 => PixelType::Float64,
        other => {
            return Err(RasterError::UnsupportedDataType {
                path: path.to_path_buf(),
                data_type: format!("{:?}", other),
            })
        }
    };

    let mut data = vec![0.0f64; width * height];
    band.read_into_slice::<f64>((0, 0), (width, height), (width, height), &mut data, None)?;

    let geo_transform = match dataset.geo_transform() {
        Ok(gt) => gt,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "No geotransform, using identity");
            IDENTITY_TRANSFORM
        }
    };

    let no_data = band.no_data_value();
    debug!(
        path = %path.display(),
        width,
        height,
        pixel_type = %pixel_type,
        no_data = ?no_data,
        "Raster loaded"
    );

    Ok(Raster {
        width,
        height,
        data,
        geo_transform,
        projection: dataset.projection(),
        no_data,
        pixel_type,
    })
}

/// Écrit un tableau en GeoTIFF mono-bande compressé (LZW)
///
/// Géotransformation, projection, taille et type de pixel sont repris du
/// template. Le NoData est `no_data` s'il est fourni, sinon celui du template.
pub fn write(
    template: &Raster,
    data: &[f64],
    path: &Path,
    no_data: Option<f64>,
) -> Result<(), RasterError> {
    write_as(template, data, path, no_data, template.pixel_type)
}

/// Comme [`write`], avec un type de pixel explicite
pub fn write_as(
    template: &Raster,
    data: &[f64],
    path: &Path,
    no_data: Option<f64>,
    pixel_type: PixelType,
) -> Result<(), RasterError> {
    if data.len() != template.len() {
        return Err(RasterError::ShapeMismatch {
            expected: template.len(),
            actual: data.len(),
        });
    }

    let no_data = no_data.or(template.no_data);

    match pixel_type {
        PixelType::UInt8 => write_typed::<u8>(template, data, path, no_data),
        PixelType::UInt16 => write_typed::<u16>(template, data, path, no_data),
        PixelType::Int16 => write_typed::<i16>(template, data, path, no_data),
        PixelType::UInt32 => write_typed::<u32>(template, data, path, no_data),
        PixelType::Int32 => write_typed::<i32>(template, data, path, no_data),
        PixelType::Float32 => write_typed::<f32>(template, data, path, no_data),
        PixelType::Float64 => write_typed::<f64>(template, data, path, no_data),
    }?;

    debug!(path = %path.display(), pixel_type = %pixel_type, no_data = ?no_data, "Raster written");
    Ok(())
}

fn write_typed<T: GdalType + Copy + FromPixel>(
    template: &Raster,
    data: &[f64],
    path: &Path,
    no_data: Option<f64>,
) -> Result<(), RasterError> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;

    let mut options = CslStringList::new();
    options.set_name_value("COMPRESS", "LZW")?;

    let mut dataset = driver.create_with_band_type_with_options::<T, _>(
        path,
        template.width,
        template.height,
        1,
        &options,
    )?;
    dataset.set_geo_transform(&template.geo_transform)?;
    if !template.projection.is_empty() {
        dataset.set_projection(&template.projection)?;
    }

    let mut band = dataset.rasterband(1)?;
    if no_data.is_some() {
        band.set_no_data_value(no_data)?;
    }

    let pixels: Vec<T> = data.iter().map(|&v| T::from_pixel(v)).collect();
    let mut buffer = Buffer::new((template.width, template.height), pixels);
    band.write((0, 0), (template.width, template.height), &mut buffer)?;

    Ok(())
}

/// Conversion d'une valeur f64 vers le type de pixel cible (saturante)
trait FromPixel {
    fn from_pixel(value: f64) -> Self;
}

macro_rules! impl_from_pixel {
    ($($t:ty),*) => {
        $(
            impl FromPixel for $t {
                fn from_pixel(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_from_pixel!(u8, u16, i16, u32, i32, f32, f64);
