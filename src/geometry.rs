use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Default outward offset, in pixels, applied to every corner before rectification
pub const DEFAULT_PADDING: i32 = 5;

/// Integer pixel coordinate in the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x as f64 - other.x as f64).hypot(self.y as f64 - other.y as f64)
    }
}

/// Four ordered corners of a text region: top-left, top-right, bottom-right, bottom-left.
/// The order is taken as given and never re-sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Build from `[x0, y0, x1, y1, x2, y2, x3, y3]`
    pub fn from_coords(c: [i32; 8]) -> Self {
        Self::new([
            Point::new(c[0], c[1]),
            Point::new(c[2], c[3]),
            Point::new(c[4], c[5]),
            Point::new(c[6], c[7]),
        ])
    }

    /// Push every corner outward by `pad` pixels along the image axes.
    ///
    /// The offsets follow the corner convention, not the box's own orientation,
    /// so a strongly rotated box is grown on one side and can shrink on another.
    pub fn padded(&self, pad: i32) -> Quad {
        let [p0, p1, p2, p3] = self.points;
        Quad::new([
            Point::new(p0.x.saturating_sub(pad), p0.y.saturating_sub(pad)),
            Point::new(p1.x.saturating_add(pad), p1.y.saturating_sub(pad)),
            Point::new(p2.x.saturating_add(pad), p2.y.saturating_add(pad)),
            Point::new(p3.x.saturating_sub(pad), p3.y.saturating_add(pad)),
        ])
    }

    /// Length of the top edge (p0 to p1)
    pub fn width(&self) -> f64 {
        self.points[0].distance(&self.points[1])
    }

    /// Length of the left edge (p0 to p3)
    pub fn height(&self) -> f64 {
        self.points[0].distance(&self.points[3])
    }

    pub fn as_f64(&self) -> [(f64, f64); 4] {
        self.points.map(|p| (p.x as f64, p.y as f64))
    }
}

/// Upright rectangle corners matching the quad corner order
pub fn rectangle_corners(width: f64, height: f64) -> [(f64, f64); 4] {
    [(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)]
}

/// Solve the homography that maps each `src[i]` onto `dst[i]`.
///
/// Fixes h33 = 1 and solves the remaining 8 unknowns from the 8 linear
/// equations given by the 4 correspondences. Returns `None` when the system is
/// singular, which happens for collinear or coincident corners.
pub fn perspective_transform(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Option<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (&(x, y), &(u, v))) in src.iter().zip(dst.iter()).enumerate() {
        let r = i * 2;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -x * u;
        a[(r, 7)] = -y * u;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -x * v;
        a[(r + 1, 7)] = -y * v;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b)?;
    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(Matrix3::new(
        h[0], h[1], h[2],
        h[3], h[4], h[5],
        h[6], h[7], 1.0,
    ))
}

/// Transform a point using a projective matrix
pub fn transform_point(matrix: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let p = Vector3::new(x, y, 1.0);
    let result = matrix * p;
    (result.x / result.z, result.y / result.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Quad {
        Quad::from_coords([0, 0, 10, 0, 10, 10, 0, 10])
    }

    fn shoelace_area(q: &Quad) -> f64 {
        let p = q.as_f64();
        let twice: f64 = (0..4)
            .map(|i| {
                let (x0, y0) = p[i];
                let (x1, y1) = p[(i + 1) % 4];
                x0 * y1 - x1 * y0
            })
            .sum();
        twice.abs() / 2.0
    }

    #[test]
    fn test_padding_offsets() {
        let padded = square().padded(DEFAULT_PADDING);
        assert_eq!(padded, Quad::from_coords([-5, -5, 15, -5, 15, 15, -5, 15]));
        assert!(shoelace_area(&padded) > shoelace_area(&square()));
    }

    #[test]
    fn test_zero_padding_is_identity() {
        assert_eq!(square().padded(0), square());
    }

    #[test]
    fn test_padding_saturates() {
        let (lo, hi) = (i32::MIN, i32::MAX);
        let q = Quad::from_coords([lo, lo, hi, lo, hi, hi, lo, hi]);
        assert_eq!(q.padded(DEFAULT_PADDING), q);
    }

    #[test]
    fn test_padded_dimensions() {
        let padded = square().padded(DEFAULT_PADDING);
        assert!((padded.width() - 20.0).abs() < 1e-9);
        assert!((padded.height() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_dimensions_use_top_and_left_edges() {
        // Right and bottom edges are longer but do not count
        let q = Quad::from_coords([0, 0, 3, 4, 30, 40, 0, 6]);
        assert!((q.width() - 5.0).abs() < 1e-9);
        assert!((q.height() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_homography_maps_corners() {
        let src = Quad::from_coords([12, 7, 58, 15, 55, 40, 9, 31]).as_f64();
        let dst = rectangle_corners(46.0, 24.0);
        let m = perspective_transform(&src, &dst).unwrap();

        for (s, d) in src.iter().zip(dst.iter()) {
            let (x, y) = transform_point(&m, s.0, s.1);
            assert!((x - d.0).abs() < 1e-6, "x: {} vs {}", x, d.0);
            assert!((y - d.1).abs() < 1e-6, "y: {} vs {}", y, d.1);
        }
    }

    #[test]
    fn test_homography_is_order_sensitive() {
        let src = square().padded(DEFAULT_PADDING).as_f64();
        let dst = rectangle_corners(20.0, 20.0);
        let shifted = [dst[1], dst[0], dst[3], dst[2]];

        let m = perspective_transform(&src, &dst).unwrap();
        let m_shifted = perspective_transform(&src, &shifted).unwrap();
        assert!((m - m_shifted).abs().max() > 1e-6);

        let (x, _) = transform_point(&m_shifted, -5.0, -5.0);
        assert!((x - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_collinear_corners_are_singular() {
        let src = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)];
        let dst = rectangle_corners(10.0, 10.0);
        assert!(perspective_transform(&src, &dst).is_none());
    }
}
