/// A 2D affine transform stored as the top two rows of a 3x3 matrix:
/// `[a, b, tx, c, d, ty]`.
///
/// Canvases keep one of these as their current transform and pre-concatenate
/// every `translate`/`rotate`/`scale` call onto it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub data: [f32; 6],
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, // row 0
            0.0, 1.0, 0.0, // row 1
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            data: [
                1.0, 0.0, x, // row 0
                0.0, 1.0, y, // row 1
            ],
        }
    }

    /// Clockwise rotation (y axis points down) about the origin.
    pub fn rotate_degrees(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            data: [
                cos, -sin, 0.0, // row 0
                sin, cos, 0.0, // row 1
            ],
        }
    }

    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            data: [
                sx, 0.0, 0.0, // row 0
                0.0, sy, 0.0, // row 1
            ],
        }
    }

    /// Compose: `self * other`. Applies `other` first, then `self`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, tx1, c1, d1, ty1] = self.data;
        let [a2, b2, tx2, c2, d2, ty2] = other.data;
        Matrix {
            data: [
                a1 * a2 + b1 * c2,
                a1 * b2 + b1 * d2,
                a1 * tx2 + b1 * ty2 + tx1,
                c1 * a2 + d1 * c2,
                c1 * b2 + d1 * d2,
                c1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    /// Inverse transform, or identity when the matrix is degenerate.
    pub fn inverse(&self) -> Matrix {
        let [a, b, tx, c, d, ty] = self.data;
        let det = a * d - b * c;
        if det.abs() < 1e-10 {
            return Self::IDENTITY;
        }
        let inv_det = 1.0 / det;
        Matrix {
            data: [
                d * inv_det,
                -b * inv_det,
                (-d * tx + b * ty) * inv_det,
                -c * inv_det,
                a * inv_det,
                (c * tx - a * ty) * inv_det,
            ],
        }
    }

    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, tx, c, d, ty] = self.data;
        (a * x + b * y + tx, c * x + d * y + ty)
    }

    pub fn translation(&self) -> (f32, f32) {
        (self.data[2], self.data[5])
    }

    /// True when the matrix only translates.
    pub fn is_translate_only(&self) -> bool {
        let [a, b, _, c, d, _] = self.data;
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
