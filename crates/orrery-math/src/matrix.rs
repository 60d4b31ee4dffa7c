use std::ops::Mul;

use crate::Vector3;

/// Determinant magnitude below which a matrix is treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Row-major 4×4 affine transform. `m[row][col]`.
///
/// Transforms act on column vectors: `p' = M · p`. Composition `A * B`
/// applies `B` first, then `A`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4 {
    pub m: [[f64; 4]; 4],
}

impl Matrix4 {
    /// The identity transform.
    pub const IDENTITY: Matrix4 = Matrix4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build a matrix from rows.
    pub const fn from_rows(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Pure translation by `t`.
    pub fn translation(t: Vector3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][3] = t.x;
        out.m[1][3] = t.y;
        out.m[2][3] = t.z;
        out
    }

    /// Right-handed rotation of `angle` radians about +X.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation of `angle` radians about +Y.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation of `angle` radians about +Z.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation of `angle` radians about an arbitrary axis (Rodrigues' formula).
    ///
    /// `R = I·cosθ + sinθ·[k]× + (1 − cosθ)·k·kᵀ` with `k` the normalized axis.
    /// A zero-length axis yields the identity.
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let k = axis.normalize();
        if k == Vector3::ZERO {
            return Self::IDENTITY;
        }
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (k.x, k.y, k.z);
        Self::from_rows([
            [t * x * x + c, t * x * y - s * z, t * x * z + s * y, 0.0],
            [t * x * y + s * z, t * y * y + c, t * y * z - s * x, 0.0],
            [t * x * z - s * y, t * y * z + s * x, t * z * z + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.m[c][r];
            }
        }
        Self::from_rows(out)
    }

    /// Determinant of the 3×3 minor that excludes `row` and `col`.
    fn minor(&self, row: usize, col: usize) -> f64 {
        let mut sub = [[0.0; 3]; 3];
        let mut si = 0;
        for r in (0..4).filter(|&r| r != row) {
            let mut sj = 0;
            for c in (0..4).filter(|&c| c != col) {
                sub[si][sj] = self.m[r][c];
                sj += 1;
            }
            si += 1;
        }
        sub[0][0] * (sub[1][1] * sub[2][2] - sub[1][2] * sub[2][1])
            - sub[0][1] * (sub[1][0] * sub[2][2] - sub[1][2] * sub[2][0])
            + sub[0][2] * (sub[1][0] * sub[2][1] - sub[1][1] * sub[2][0])
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
        sign * self.minor(row, col)
    }

    /// Determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> f64 {
        (0..4).map(|c| self.m[0][c] * self.cofactor(0, c)).sum()
    }

    /// General inverse via the adjugate: `M⁻¹ = adj(M) / det(M)`.
    ///
    /// Returns `None` when `|det| < SINGULAR_DETERMINANT` or the determinant
    /// is not finite.
    pub fn try_inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
            return None;
        }
        let inv_det = 1.0 / det;
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                // adj(M)[r][c] = cofactor(c, r)
                *value = self.cofactor(c, r) * inv_det;
            }
        }
        Some(Self::from_rows(out))
    }

    /// Inverse, falling back to the identity for singular matrices.
    ///
    /// Singular transforms only arise from degenerate configuration, so the
    /// fallback keeps a frame query alive instead of failing it.
    pub fn inverse(&self) -> Self {
        self.try_inverse().unwrap_or(Self::IDENTITY)
    }

    /// Transform a point (w = 1): rotation, scale and translation apply.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }

    /// Transform a direction (w = 0): translation is ignored.
    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Translation column.
    pub fn translation_part(&self) -> Vector3 {
        Vector3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// Same transform with the translation column cleared.
    pub fn without_translation(&self) -> Self {
        let mut out = *self;
        out.m[0][3] = 0.0;
        out.m[1][3] = 0.0;
        out.m[2][3] = 0.0;
        out
    }

    /// Returns true if every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
    }

    /// Entry-wise comparison within `epsilon`.
    pub fn abs_diff_eq(&self, rhs: &Matrix4, epsilon: f64) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(rhs.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Self::Output {
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.m[r][k] * rhs.m[k][c]).sum();
            }
        }
        Matrix4::from_rows(out)
    }
}

impl From<glam::DMat4> for Matrix4 {
    fn from(mat: glam::DMat4) -> Self {
        // glam stores columns; ours are rows.
        Matrix4::from_rows(mat.to_cols_array_2d()).transpose()
    }
}

impl From<Matrix4> for glam::DMat4 {
    fn from(mat: Matrix4) -> Self {
        glam::DMat4::from_cols_array_2d(&mat.transpose().m)
    }
}
