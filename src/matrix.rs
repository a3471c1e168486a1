//! 2D affine matrix in homogeneous 3×3 form.
//!
//! The bottom row is always `[0, 0, 1]`: every constructor goes through
//! [`AffineMatrix::from_columns`] and multiplication preserves it.

use std::fmt;
use std::ops::Mul;

use glam::{DMat2, DMat3, DVec2, dvec2};

/// Off-diagonal terms of an ellipse's shape matrix below this fraction of
/// its trace count as zero.
const AXIS_TOLERANCE: f64 = 1e-12;

/// Coordinate axis of a single-axis length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    /// Unit vector along this axis.
    pub fn basis(self) -> DVec2 {
        match self {
            Axis::X => DVec2::X,
            Axis::Y => DVec2::Y,
        }
    }
}

/// An affine map `p -> linear · p + translation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMatrix(DMat3);

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineMatrix {
    pub const IDENTITY: AffineMatrix = AffineMatrix(DMat3::IDENTITY);

    /// Build from the two linear columns and the translation column.
    ///
    /// `from_columns((a, b), (c, d), (e, f))` is SVG's `matrix(a, b, c, d, e, f)`.
    pub fn from_columns(col0: DVec2, col1: DVec2, translation: DVec2) -> Self {
        AffineMatrix(DMat3::from_cols(
            col0.extend(0.0),
            col1.extend(0.0),
            translation.extend(1.0),
        ))
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::from_columns(DVec2::X, DVec2::Y, DVec2::new(tx, ty))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::from_columns(DVec2::new(sx, 0.0), DVec2::new(0.0, sy), DVec2::ZERO)
    }

    /// Counter-clockwise rotation (in SVG's y-down space: clockwise on screen).
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::from_columns(DVec2::new(cos, sin), DVec2::new(-sin, cos), DVec2::ZERO)
    }

    /// Shear `x += tan(angle) · y` (`tan_x`) and `y += tan(angle) · x` (`tan_y`).
    pub fn shear(tan_x: f64, tan_y: f64) -> Self {
        Self::from_columns(DVec2::new(1.0, tan_y), DVec2::new(tan_x, 1.0), DVec2::ZERO)
    }

    /// The 2×2 linear block.
    pub fn linear(&self) -> DMat2 {
        DMat2::from_cols(self.0.x_axis.truncate(), self.0.y_axis.truncate())
    }

    /// The translation column.
    pub fn translation_part(&self) -> DVec2 {
        self.0.z_axis.truncate()
    }

    /// SVG `matrix()` coefficients `[a, b, c, d, e, f]`.
    pub fn coefficients(&self) -> [f64; 6] {
        let (x, y, z) = (self.0.x_axis, self.0.y_axis, self.0.z_axis);
        [x.x, x.y, y.x, y.y, z.x, z.y]
    }

    /// Element at `row`, `col` of the 3×3 form.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0.col(col)[row]
    }

    pub fn is_identity(&self) -> bool {
        self.0 == DMat3::IDENTITY
    }

    /// `linear · p + translation`.
    pub fn apply_to_point(&self, point: DVec2) -> DVec2 {
        (self.0 * point.extend(1.0)).truncate()
    }

    /// Linear part only: `apply(v) - apply(0)`.
    pub fn apply_to_point_diff(&self, vector: DVec2) -> DVec2 {
        self.apply_to_point(vector) - self.apply_to_point(DVec2::ZERO)
    }

    /// Treat `diff` as a displacement purely along `axis` and return the signed
    /// component along that same axis after the map.
    pub fn apply_to_length_diff(&self, diff: f64, axis: Axis) -> f64 {
        self.apply_to_point_diff(axis.basis() * diff)[axis.index()]
    }

    /// Map the axis vectors scaled by `lengths.x`, `lengths.y` and return their norms.
    ///
    /// Used for radius pairs (ellipse `rx`/`ry`, arc radii).
    pub fn apply_to_length_pair(&self, lengths: DVec2) -> DVec2 {
        DVec2::new(
            self.apply_to_point_diff(DVec2::new(lengths.x, 0.0)).length(),
            self.apply_to_point_diff(DVec2::new(0.0, lengths.y)).length(),
        )
    }

    /// Determinant of the linear block.
    pub fn determinant(&self) -> f64 {
        self.linear().determinant()
    }

    /// Uniform length factor `sqrt(|det|)` for scale-sensitive values like stroke width.
    pub fn length_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// True when the map mirrors orientation.
    pub fn is_reflection(&self) -> bool {
        self.determinant() < 0.0
    }

    /// True when the linear block has no off-diagonal terms, so boxes and
    /// ellipses aligned with the axes stay aligned.
    pub fn keeps_axes(&self) -> bool {
        let [_, b, c, ..] = self.coefficients();
        b == 0.0 && c == 0.0
    }

    /// Map the ellipse with semi-axes `radii`, rotated by `rotation` degrees,
    /// and return the semi-axes and rotation of its image.
    ///
    /// The image is `L·E` for `E = R(rotation)·diag(radii)`; its axes are the
    /// eigenvectors of `(L·E)(L·E)ᵀ`. An image aligned with the axes keeps
    /// rotation `0` and `rx` along x, which matches
    /// [`AffineMatrix::apply_to_length_pair`] for unrotated input. Otherwise
    /// `rx` follows the image of the original `rx` axis.
    pub fn apply_to_ellipse(&self, radii: DVec2, rotation: f64) -> (DVec2, f64) {
        let ellipse = DMat2::from_angle(rotation.to_radians()) * DMat2::from_diagonal(radii);
        let image = self.linear() * ellipse;
        let shape = image * image.transpose();
        let (p, q, r) = (shape.x_axis.x, shape.y_axis.x, shape.y_axis.y);

        if q.abs() <= AXIS_TOLERANCE * (p + r) {
            return (dvec2(p.max(0.0).sqrt(), r.max(0.0).sqrt()), 0.0);
        }

        let mean = (p + r) / 2.0;
        let spread = ((p - r) / 2.0).hypot(q);
        let major = (mean + spread).max(0.0).sqrt();
        let minor = (mean - spread).max(0.0).sqrt();
        let angle = (2.0 * q).atan2(p - r) / 2.0;

        // Keep `rx` on the axis nearest to where the old `rx` axis went.
        let mapped_x = image.x_axis;
        let (sin, cos) = angle.sin_cos();
        if mapped_x.dot(dvec2(cos, sin)).abs() >= mapped_x.dot(dvec2(-sin, cos)).abs() {
            (dvec2(major, minor), angle.to_degrees())
        } else {
            let turned = angle + std::f64::consts::FRAC_PI_2;
            let turned = if turned > std::f64::consts::FRAC_PI_2 {
                turned - std::f64::consts::PI
            } else {
                turned
            };
            (dvec2(minor, major), turned.to_degrees())
        }
    }
}

impl Mul for AffineMatrix {
    type Output = AffineMatrix;

    /// `(self * rhs).apply(p) == self.apply(rhs.apply(p))`
    fn mul(self, rhs: AffineMatrix) -> AffineMatrix {
        AffineMatrix(self.0 * rhs.0)
    }
}

impl fmt::Display for AffineMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.coefficients();
        write!(f, "matrix({a}, {b}, {c}, {d}, {e}, {g})")
    }
}
