//! GeoTIFF tile decoding.
//!
//! Reads the first band of a GeoTIFF together with its georeferencing:
//!
//! - ModelPixelScale (33550) + ModelTiepoint (33922), or
//! - ModelTransformation (34264), a 4×4 row-major matrix that may carry rotation
//!
//! A PixelIsPoint raster type in the GeoKeyDirectory (34735) shifts the
//! transform by half a pixel so it addresses pixel corners. The no-data
//! sentinel comes from the GDAL_NODATA tag (42113), stored as ASCII.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

use super::{RasterTile, Samples};
use crate::error::{Result, TerrainError};
use crate::transform::GeoTransform;

/// GTRasterTypeGeoKey.
const RASTER_TYPE_GEO_KEY: u32 = 1025;
/// RasterPixelIsPoint value of [`RASTER_TYPE_GEO_KEY`].
const RASTER_PIXEL_IS_POINT: u32 = 2;

/// Open a GeoTIFF tile and decode its samples.
pub fn open(path: &Path) -> Result<RasterTile> {
    let file = File::open(path)?;
    let decoder = Decoder::new(file).map_err(|e| TerrainError::malformed(path, e))?;

    // 1 arc-second tiles are 3601 x 3601 f32 samples (~52 MB); allow headroom
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 64 * 1024 * 1024;
    let mut decoder = decoder.with_limits(limits);

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| TerrainError::malformed(path, e))?;
    let (width, height) = (width as usize, height as usize);

    let mut transform = read_transform(&mut decoder)
        .ok_or_else(|| TerrainError::malformed(path, "missing georeferencing tags"))?;
    if is_pixel_is_point(&mut decoder) {
        transform = transform.shifted(-0.5, -0.5);
    }
    let nodata = read_nodata(&mut decoder);

    let samples = decode_samples(&mut decoder).map_err(|e| TerrainError::malformed(path, e))?;
    let samples = first_band(samples, width * height).ok_or_else(|| {
        TerrainError::malformed(path, format!("too few samples for a {}x{} raster", width, height))
    })?;

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        nodata = ?nodata,
        "Opened GeoTIFF tile"
    );

    Ok(RasterTile::from_parts(
        path.to_path_buf(),
        transform,
        width,
        height,
        samples,
        nodata,
    ))
}

/// Read the affine transform from GeoTIFF model tags.
fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();

    if let (Some(scale), Some(tiepoint)) = (&scale, &tiepoint) {
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // Tiepoint format: [i, j, k, x, y, z] ties raster (i, j) to model (x, y)
            let (sx, sy) = (scale[0], scale[1]);
            let origin_x = tiepoint[3] - tiepoint[0] * sx;
            let origin_y = tiepoint[4] + tiepoint[1] * sy;
            return Some(GeoTransform::north_up(origin_x, origin_y, sx, sy));
        }
    }

    let matrix = decoder.get_tag_f64_vec(Tag::ModelTransformationTag).ok()?;
    if matrix.len() < 16 {
        return None;
    }

    // Row-major 4x4: x = m0*col + m1*row + m3, y = m4*col + m5*row + m7
    Some(GeoTransform::new(
        matrix[0], matrix[1], matrix[3], matrix[4], matrix[5], matrix[7],
    ))
}

/// Check the GeoKeyDirectory for a PixelIsPoint raster type.
///
/// Directory layout: a 4-value header `[version, revision, minor, count]`
/// followed by `count` entries of `[key, location, count, value]`.
fn is_pixel_is_point<R: Read + Seek>(decoder: &mut Decoder<R>) -> bool {
    let Ok(directory) = decoder.get_tag_u32_vec(Tag::GeoKeyDirectoryTag) else {
        return false;
    };
    let Some(&count) = directory.get(3) else {
        return false;
    };

    directory
        .get(4..)
        .unwrap_or_default()
        .chunks_exact(4)
        .take(count as usize)
        .any(|entry| {
            // location 0 means the value is stored inline
            entry[0] == RASTER_TYPE_GEO_KEY && entry[1] == 0 && entry[3] == RASTER_PIXEL_IS_POINT
        })
}

/// Try to read the no-data value from the GDAL_NODATA tag.
fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse().ok())
}

/// Decode the image samples.
///
/// Band types that `f32` represents exactly stay `f32`; everything wider is
/// kept as `f64` so sentinels compare at the band's precision.
fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> tiff::TiffResult<Samples> {
    let samples = match decoder.read_image()? {
        DecodingResult::F32(data) => Samples::Float32(data),
        DecodingResult::I8(data) => Samples::Float32(data.into_iter().map(f32::from).collect()),
        DecodingResult::I16(data) => Samples::Float32(data.into_iter().map(f32::from).collect()),
        DecodingResult::U8(data) => Samples::Float32(data.into_iter().map(f32::from).collect()),
        DecodingResult::U16(data) => Samples::Float32(data.into_iter().map(f32::from).collect()),
        DecodingResult::F64(data) => Samples::Float64(data),
        DecodingResult::I32(data) => Samples::Float64(data.into_iter().map(f64::from).collect()),
        DecodingResult::U32(data) => Samples::Float64(data.into_iter().map(f64::from).collect()),
        DecodingResult::I64(data) => Samples::Float64(data.into_iter().map(|v| v as f64).collect()),
        DecodingResult::U64(data) => Samples::Float64(data.into_iter().map(|v| v as f64).collect()),
    };

    Ok(samples)
}

/// Keep the first band of pixel-interleaved samples.
///
/// Returns `None` if there are fewer samples than pixels.
fn first_band(samples: Samples, pixels: usize) -> Option<Samples> {
    fn take<T: Copy>(data: Vec<T>, pixels: usize) -> Option<Vec<T>> {
        if pixels == 0 || data.len() < pixels {
            return None;
        }
        let bands = data.len() / pixels;
        Some(if bands > 1 {
            data.into_iter().step_by(bands).take(pixels).collect()
        } else {
            data
        })
    }

    match samples {
        Samples::Float32(data) => take(data, pixels).map(Samples::Float32),
        Samples::Float64(data) => take(data, pixels).map(Samples::Float64),
        other => Some(other),
    }
}
