//! Affine georeferencing transform.

/// Six-parameter affine transform mapping pixel `(col, row)` to geographic
/// `(x, y)` = `(longitude, latitude)`:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// Pixel coordinates refer to the top-left corner of a pixel; the centre of
/// pixel `(col, row)` is at `(col + 0.5, row + 0.5)`. For north-up rasters `b`
/// and `d` are zero and `e` is negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// Pixel width (x change per column).
    pub a: f64,
    /// Row rotation (x change per row).
    pub b: f64,
    /// X of the upper-left corner.
    pub c: f64,
    /// Column rotation (y change per column).
    pub d: f64,
    /// Pixel height (y change per row, usually negative).
    pub e: f64,
    /// Y of the upper-left corner.
    pub f: f64,
}

impl GeoTransform {
    /// Create a transform from its six coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create a north-up transform from the upper-left corner and pixel size.
    ///
    /// `pixel_height` is the positive southward size of a row.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height, origin_y)
    }

    /// Apply the transform to fractional pixel coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Move the origin to fractional pixel `(col, row)` of this transform.
    pub fn shifted(&self, col: f64, row: f64) -> Self {
        let (c, f) = self.apply(col, row);
        Self { c, f, ..*self }
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Invert the transform for geographic `(x, y)`.
    ///
    /// Returns fractional `(col, row)`, or `None` if the transform is singular.
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-18 {
            return None;
        }

        let dx = x - self.c;
        let dy = y - self.f;

        let col = (self.e * dx - self.b * dy) / det;
        let row = (-self.d * dx + self.a * dy) / det;

        Some((col, row))
    }

    /// Envelope of a `width × height` raster as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(0.0, h),
            self.apply(w, h),
        ];

        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }

    /// Check if this is a north-up transform (no rotation).
    pub fn is_north_up(&self) -> bool {
        self.b.abs() < 1e-12 && self.d.abs() < 1e-12 && self.e < 0.0
    }
}
