//! Fixture writers shared by unit tests.

use std::fs::File;
use std::path::{Path, PathBuf};

use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

/// SRTM3 samples per row/column.
pub const SRTM3_SAMPLES: usize = 1201;

/// GeoKeyDirectory declaring `GTRasterTypeGeoKey = RasterPixelIsPoint`.
pub const PIXEL_IS_POINT_KEYS: [u16; 8] = [1, 1, 0, 1, 1025, 0, 1, 2];

/// Write a north-up single-band `f32` GeoTIFF.
///
/// `origin` is the `(lon, lat)` of the upper-left corner and `pixel_size` the
/// square pixel size in degrees.
#[allow(clippy::too_many_arguments)]
pub fn write_geotiff(
    dir: &Path,
    filename: &str,
    width: u32,
    height: u32,
    data: &[f32],
    origin: (f64, f64),
    pixel_size: f64,
    nodata: Option<&str>,
) -> PathBuf {
    write_north_up::<colortype::Gray32Float>(
        dir, filename, width, height, data, origin, pixel_size, nodata, None,
    )
}

/// Write a north-up single-band `f64` GeoTIFF.
#[allow(clippy::too_many_arguments)]
pub fn write_geotiff_f64(
    dir: &Path,
    filename: &str,
    width: u32,
    height: u32,
    data: &[f64],
    origin: (f64, f64),
    pixel_size: f64,
    nodata: Option<&str>,
) -> PathBuf {
    write_north_up::<colortype::Gray64Float>(
        dir, filename, width, height, data, origin, pixel_size, nodata, None,
    )
}

/// Write a north-up `f32` GeoTIFF whose tiepoint addresses the centre of
/// the first pixel (PixelIsPoint).
pub fn write_point_geotiff(
    dir: &Path,
    filename: &str,
    width: u32,
    height: u32,
    data: &[f32],
    first_center: (f64, f64),
    pixel_size: f64,
) -> PathBuf {
    write_north_up::<colortype::Gray32Float>(
        dir,
        filename,
        width,
        height,
        data,
        first_center,
        pixel_size,
        None,
        Some(&PIXEL_IS_POINT_KEYS),
    )
}

#[allow(clippy::too_many_arguments)]
fn write_north_up<C: ColorType>(
    dir: &Path,
    filename: &str,
    width: u32,
    height: u32,
    data: &[C::Inner],
    origin: (f64, f64),
    pixel_size: f64,
    nodata: Option<&str>,
    geo_keys: Option<&[u16]>,
) -> PathBuf
where
    [C::Inner]: TiffValue,
{
    let path = dir.join(filename);
    let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
    let mut image = encoder.new_image::<C>(width, height).unwrap();

    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[pixel_size, pixel_size, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(
            Tag::ModelTiepointTag,
            &[0.0, 0.0, 0.0, origin.0, origin.1, 0.0][..],
        )
        .unwrap();
    if let Some(keys) = geo_keys {
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, keys)
            .unwrap();
    }
    if let Some(nodata) = nodata {
        image.encoder().write_tag(Tag::GdalNodata, nodata).unwrap();
    }

    image.write_data(data).unwrap();
    path
}

/// Write a single-band `f32` GeoTIFF georeferenced by a ModelTransformation matrix.
pub fn write_geotiff_with_matrix(
    dir: &Path,
    filename: &str,
    width: u32,
    height: u32,
    data: &[f32],
    matrix: &[f64; 16],
) -> PathBuf {
    let path = dir.join(filename);
    let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(width, height)
        .unwrap();

    image
        .encoder()
        .write_tag(Tag::ModelTransformationTag, &matrix[..])
        .unwrap();

    image.write_data(data).unwrap();
    path
}

/// Write a TIFF with no georeferencing tags.
pub fn write_plain_tiff(
    dir: &Path,
    filename: &str,
    width: u32,
    height: u32,
    data: &[f32],
) -> PathBuf {
    let path = dir.join(filename);
    let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
    encoder
        .write_image::<colortype::Gray32Float>(width, height, data)
        .unwrap();
    path
}

/// Write an SRTM3 `.hgt` file where every sample is `elevation_at(row, col)`.
pub fn write_hgt(dir: &Path, filename: &str, elevation_at: impl Fn(usize, usize) -> i16) -> PathBuf {
    let mut data = vec![0u8; SRTM3_SAMPLES * SRTM3_SAMPLES * 2];
    for row in 0..SRTM3_SAMPLES {
        for col in 0..SRTM3_SAMPLES {
            let offset = (row * SRTM3_SAMPLES + col) * 2;
            let bytes = elevation_at(row, col).to_be_bytes();
            data[offset] = bytes[0];
            data[offset + 1] = bytes[1];
        }
    }

    let path = dir.join(filename);
    std::fs::write(&path, data).unwrap();
    path
}
