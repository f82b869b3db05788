//! Raster-derived slope estimation.
//!
//! The slope at a point is estimated from the 3×3 neighbourhood of the pixel
//! containing it:
//!
//! 1. Pixel spacing is taken from the transform's scale terms in degrees.
//! 2. Degrees are converted to metres at the query latitude φ:
//!    `m_per_deg_lat = 111132.954 − 559.822·cos(2φ) + 1.175·cos(4φ)` and
//!    `m_per_deg_lon = 111132.954·cos(φ)`.
//! 3. A Sobel kernel (normalised by 8) gives `dz/dx` and `dz/dy`.
//! 4. Slope is `atan(sqrt(dzdx² + dzdy²))` in degrees.

use crate::coord::Coordinate;
use crate::error::{Result, TerrainError};
use crate::raster::{Neighborhood, RasterTile};
use crate::transform::GeoTransform;

/// More missing cells than this make a neighbourhood too sparse for a gradient.
pub const MAX_MISSING_CELLS: usize = 4;

/// A slope in degrees, or no data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlopeResult {
    /// Slope angle in degrees, in `[0, 90]`.
    Degrees(f64),
    /// No slope available.
    NoData,
}

impl SlopeResult {
    /// Slope in degrees, `None` for no data.
    pub fn degrees(&self) -> Option<f64> {
        match self {
            SlopeResult::Degrees(d) => Some(*d),
            SlopeResult::NoData => None,
        }
    }
}

/// Length in metres of one degree of latitude and longitude at a latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetersPerDegree {
    /// Metres per degree of latitude.
    pub lat: f64,
    /// Metres per degree of longitude.
    pub lon: f64,
}

/// Metres per degree at `latitude` (decimal degrees).
pub fn meters_per_degree(latitude: f64) -> MetersPerDegree {
    let phi = latitude.to_radians();
    MetersPerDegree {
        lat: 111_132.954 - 559.822 * (2.0 * phi).cos() + 1.175 * (4.0 * phi).cos(),
        lon: 111_132.954 * phi.cos(),
    }
}

/// Pixel spacing `(xres, yres)` in degrees.
///
/// `yres` is expressed as a positive northward distance for north-up rasters.
pub fn pixel_spacing_degrees(transform: &GeoTransform) -> (f64, f64) {
    (transform.a, -transform.e)
}

/// Slope in degrees of a 3×3 window with pixel spacing in metres.
///
/// # Errors
///
/// Returns [`TerrainError::InsufficientNeighborhoodData`] if more than
/// [`MAX_MISSING_CELLS`] cells are missing, if the centre cell is missing, or
/// if any cell the kernel weighs is missing.
pub fn sobel_slope_degrees(window: &Neighborhood, xres_m: f64, yres_m: f64) -> Result<f64> {
    let insufficient = || TerrainError::InsufficientNeighborhoodData {
        missing: window.missing_count(),
        total: window.len(),
    };

    if window.size() != 3
        || window.missing_count() > MAX_MISSING_CELLS
        || window.center().is_none()
    {
        return Err(insufficient());
    }

    let z = |row: usize, col: usize| window.get(row, col);
    let (Some(z00), Some(z01), Some(z02)) = (z(0, 0), z(0, 1), z(0, 2)) else {
        return Err(insufficient());
    };
    let (Some(z10), Some(z12)) = (z(1, 0), z(1, 2)) else {
        return Err(insufficient());
    };
    let (Some(z20), Some(z21), Some(z22)) = (z(2, 0), z(2, 1), z(2, 2)) else {
        return Err(insufficient());
    };

    let dzdx = ((z02 + 2.0 * z12 + z22) - (z00 + 2.0 * z10 + z20)) / (8.0 * xres_m);
    let dzdy = ((z20 + 2.0 * z21 + z22) - (z00 + 2.0 * z01 + z02)) / (8.0 * yres_m);

    Ok((dzdx * dzdx + dzdy * dzdy).sqrt().atan().to_degrees())
}

/// Estimate the slope at `coordinate` from `tile`.
///
/// Sparse neighbourhoods degrade to [`SlopeResult::NoData`].
///
/// # Errors
///
/// Returns [`TerrainError::MalformedRaster`] if the tile's transform cannot be
/// inverted.
pub fn estimate_slope(tile: &RasterTile, coordinate: Coordinate) -> Result<SlopeResult> {
    let (row, col) = tile.pixel_index(coordinate)?;
    let window = tile.read_window(row, col, 1);

    let (xres_deg, yres_deg) = pixel_spacing_degrees(tile.transform());
    let scale = meters_per_degree(coordinate.latitude);

    match sobel_slope_degrees(&window, xres_deg * scale.lon, yres_deg * scale.lat) {
        Ok(degrees) => Ok(SlopeResult::Degrees(degrees)),
        Err(e @ TerrainError::InsufficientNeighborhoodData { .. }) => {
            tracing::debug!(
                lat = coordinate.latitude,
                lon = coordinate.longitude,
                error = %e,
                "Slope neighbourhood too sparse"
            );
            Ok(SlopeResult::NoData)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn window(values: [f64; 9]) -> Neighborhood {
        Neighborhood::from_cells(1, values.iter().map(|v| Some(*v)).collect()).unwrap()
    }

    /// 5x5 tile over N22E078.. with `f(row, col)` elevations.
    fn grid_tile(pixel_deg: f64, f: impl Fn(usize, usize) -> f32) -> RasterTile {
        let data = (0..25).map(|i| f(i / 5, i % 5)).collect();
        let transform = GeoTransform::north_up(78.0, 23.0, pixel_deg, pixel_deg);
        RasterTile::from_samples(transform, 5, 5, data, Some(-9999.0)).unwrap()
    }

    #[test]
    fn test_flat_is_zero() {
        let slope = sobel_slope_degrees(&window([250.0; 9]), 30.0, 30.0).unwrap();
        assert_eq!(slope, 0.0);
    }

    #[test]
    fn test_known_row_gradient() {
        // +delta per row southward, nothing across columns
        let delta = 10.0;
        let w = window([
            100.0, 100.0, 100.0, //
            110.0, 110.0, 110.0, //
            120.0, 120.0, 120.0,
        ]);
        let yres = 92.6;

        let slope = sobel_slope_degrees(&w, 30.0, yres).unwrap();
        assert_relative_eq!(slope, (delta / yres).atan().to_degrees(), epsilon = 1e-12);
    }

    #[test]
    fn test_known_column_gradient() {
        let w = window([
            0.0, 30.0, 60.0, //
            0.0, 30.0, 60.0, //
            0.0, 30.0, 60.0,
        ]);

        // 30 m rise over 30 m run -> 45 degrees
        let slope = sobel_slope_degrees(&w, 30.0, 90.0).unwrap();
        assert_relative_eq!(slope, 45.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_weights_diagonal_plane() {
        // z = 3*col_m + 4*row_m with 1 m pixels: gradient magnitude 5
        let w = window([
            0.0, 3.0, 6.0, //
            4.0, 7.0, 10.0, //
            8.0, 11.0, 14.0,
        ]);

        let slope = sobel_slope_degrees(&w, 1.0, 1.0).unwrap();
        assert_relative_eq!(slope, 5f64.atan().to_degrees(), epsilon = 1e-12);
    }

    #[test]
    fn test_five_missing_is_insufficient() {
        let cells = vec![
            None,
            None,
            None,
            None,
            Some(1000.0),
            None,
            Some(1.0),
            Some(2.0),
            Some(3.0),
        ];
        let w = Neighborhood::from_cells(1, cells).unwrap();

        let err = sobel_slope_degrees(&w, 30.0, 30.0).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::InsufficientNeighborhoodData {
                missing: 5,
                total: 9
            }
        ));
    }

    #[test]
    fn test_missing_kernel_cell_is_insufficient() {
        let mut cells: Vec<Option<f64>> = vec![Some(10.0); 9];
        cells[0] = None;

        let w = Neighborhood::from_cells(1, cells).unwrap();
        assert!(sobel_slope_degrees(&w, 30.0, 30.0).is_err());
    }

    #[test]
    fn test_missing_center_is_insufficient() {
        let mut cells: Vec<Option<f64>> = vec![Some(10.0); 9];
        cells[4] = None;

        let w = Neighborhood::from_cells(1, cells).unwrap();
        assert!(sobel_slope_degrees(&w, 30.0, 30.0).is_err());
    }

    #[test]
    fn test_meters_per_degree_equator() {
        let scale = meters_per_degree(0.0);
        assert_relative_eq!(scale.lon, 111_132.954, epsilon = 1e-9);
        assert_relative_eq!(scale.lat, 111_132.954 - 559.822 + 1.175, epsilon = 1e-9);
    }

    #[test]
    fn test_longitude_compression_follows_cosine() {
        let equator = meters_per_degree(0.0);
        let polar = meters_per_degree(89.0);

        assert!(polar.lon < equator.lon);
        assert_relative_eq!(
            polar.lon / equator.lon,
            89f64.to_radians().cos(),
            epsilon = 1e-12
        );
        // Latitude degrees lengthen toward the poles
        assert!(polar.lat > equator.lat);
    }

    #[test]
    fn test_pixel_spacing_sign() {
        let gt = GeoTransform::north_up(78.0, 23.0, 0.001, 0.002);
        assert_eq!(pixel_spacing_degrees(&gt), (0.001, 0.002));
    }

    #[test]
    fn test_estimate_flat_tile() {
        let tile = grid_tile(0.001, |_, _| 500.0);
        let slope = estimate_slope(&tile, Coordinate::new(22.9975, 78.0025)).unwrap();
        assert_eq!(slope, SlopeResult::Degrees(0.0));
    }

    #[test]
    fn test_estimate_constant_row_gradient() {
        let pixel_deg = 0.001;
        let delta = 5.0;
        let tile = grid_tile(pixel_deg, |row, _| 100.0 + delta as f32 * row as f32);
        let coordinate = Coordinate::new(22.9975, 78.0025);

        let slope = estimate_slope(&tile, coordinate).unwrap().degrees().unwrap();

        let yres_m = pixel_deg * meters_per_degree(coordinate.latitude).lat;
        assert_relative_eq!(slope, (delta / yres_m).atan().to_degrees(), epsilon = 1e-9);
    }

    #[test]
    fn test_estimate_uses_query_latitude_for_longitude_scale() {
        // Same column gradient at two latitudes: steeper where degrees are shorter
        let pixel_deg = 0.001;
        let low = RasterTile::from_samples(
            GeoTransform::north_up(78.0, 1.0, pixel_deg, pixel_deg),
            5,
            5,
            (0..25).map(|i| (i % 5) as f32 * 10.0).collect(),
            None,
        )
        .unwrap();
        let high = RasterTile::from_samples(
            GeoTransform::north_up(78.0, 61.0, pixel_deg, pixel_deg),
            5,
            5,
            (0..25).map(|i| (i % 5) as f32 * 10.0).collect(),
            None,
        )
        .unwrap();

        let s_low = estimate_slope(&low, Coordinate::new(0.9975, 78.0025))
            .unwrap()
            .degrees()
            .unwrap();
        let s_high = estimate_slope(&high, Coordinate::new(60.9975, 78.0025))
            .unwrap()
            .degrees()
            .unwrap();

        assert!(s_high > s_low);
        let expected_high =
            (10.0 / (pixel_deg * meters_per_degree(60.9975).lon)).atan().to_degrees();
        assert_relative_eq!(s_high, expected_high, epsilon = 1e-9);
    }

    #[test]
    fn test_estimate_corner_of_tile_is_no_data() {
        // The (0, 0) pixel has five out-of-extent neighbours
        let tile = grid_tile(0.001, |_, _| 500.0);
        let slope = estimate_slope(&tile, Coordinate::new(22.9995, 78.0005)).unwrap();
        assert_eq!(slope, SlopeResult::NoData);
    }

    #[test]
    fn test_estimate_edge_of_tile_is_no_data() {
        // Three missing cells along the top edge: within the sparsity limit,
        // but the kernel needs every cell
        let tile = grid_tile(0.001, |_, _| 500.0);
        let slope = estimate_slope(&tile, Coordinate::new(22.9995, 78.0025)).unwrap();
        assert_eq!(slope, SlopeResult::NoData);
    }

    #[test]
    fn test_estimate_mostly_nodata_is_no_data() {
        let tile = grid_tile(0.001, |row, col| {
            if (row + col) % 2 == 0 {
                -9999.0
            } else {
                42.0
            }
        });
        // Centre (2, 2) and its four diagonals are no-data: 5 of 9 missing
        let slope = estimate_slope(&tile, Coordinate::new(22.9975, 78.0025)).unwrap();
        assert_eq!(slope, SlopeResult::NoData);
    }

    #[test]
    fn test_estimate_range_on_steep_synthetic_tile() {
        let tile = grid_tile(0.0001, |row, col| (row * 400 + col * 300) as f32);
        let slope = estimate_slope(&tile, Coordinate::new(22.99975, 78.00025))
            .unwrap()
            .degrees()
            .unwrap();

        assert!((0.0..=90.0).contains(&slope));
        assert!(slope > 80.0);
    }
}
