//! 3×3 rotation matrices in the passive (frame-rotating) convention.

use std::ops::Mul;

/// A rotation matrix. `R · v` expresses `v` in the rotated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    m: [[f64; 3]; 3],
}

impl Rotation {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.m
    }

    /// Frame rotation by `angle` about the x axis.
    pub fn r1(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]])
    }

    /// Frame rotation by `angle` about the y axis.
    pub fn r2(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]])
    }

    /// Frame rotation by `angle` about the z axis.
    pub fn r3(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn transpose(&self) -> Self {
        let m = &self.m;
        Self::from_rows([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    /// `R · v`.
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        let m = &self.m;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    /// Largest element-wise difference.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        let mut worst: f64 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                worst = worst.max((self.m[i][j] - other.m[i][j]).abs());
            }
        }
        worst
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Rotation {
    type Output = Rotation;

    /// Matrix product: `(a * b) · v == a · (b · v)`.
    fn mul(self, rhs: Rotation) -> Rotation {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Rotation::from_rows(out)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn r3_quarter_turn_moves_x_to_minus_y() {
        let v = Rotation::r3(FRAC_PI_2).apply([1.0, 0.0, 0.0]);
        assert!(v[0].abs() < 1e-15);
        assert!((v[1] + 1.0).abs() < 1e-15);
    }

    #[test]
    fn transpose_is_inverse() {
        let r = Rotation::r1(0.3) * Rotation::r2(-1.1) * Rotation::r3(2.5);
        assert!((r * r.transpose()).max_abs_diff(&Rotation::IDENTITY) < 1e-15);
    }

    #[test]
    fn product_composes_application() {
        let a = Rotation::r1(0.7);
        let b = Rotation::r3(-0.2);
        let v = [0.1, -0.5, 0.8];
        let lhs = (a * b).apply(v);
        let rhs = a.apply(b.apply(v));
        for k in 0..3 {
            assert!((lhs[k] - rhs[k]).abs() < 1e-15);
        }
    }
}
