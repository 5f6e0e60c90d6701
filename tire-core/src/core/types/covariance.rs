//! Pose covariance.

use serde::{Deserialize, Serialize};

/// 3x3 covariance matrix for 2D pose uncertainty (x, y, theta).
///
/// Stored as row-major array: [xx, xy, xt, yx, yy, yt, tx, ty, tt]
/// where t = theta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Covariance2D {
    /// Row-major 3x3 matrix data
    data: [f32; 9],
}

impl Covariance2D {
    /// Create a zero covariance matrix.
    #[inline]
    pub fn zero() -> Self {
        Self { data: [0.0; 9] }
    }

    /// Identity matrix (unit variance on every axis).
    #[inline]
    pub fn identity() -> Self {
        Self::diagonal(1.0, 1.0, 1.0)
    }

    /// Create a diagonal covariance matrix.
    ///
    /// Parameters are variances: xx = σ²_x, yy = σ²_y, tt = σ²_θ
    #[inline]
    pub fn diagonal(xx: f32, yy: f32, tt: f32) -> Self {
        Self {
            data: [xx, 0.0, 0.0, 0.0, yy, 0.0, 0.0, 0.0, tt],
        }
    }

    /// Create from row-major array.
    #[inline]
    pub fn from_array(data: [f32; 9]) -> Self {
        Self { data }
    }

    /// Element at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * 3 + col]
    }

    /// Variance of x (element [0,0]).
    #[inline]
    pub fn var_x(&self) -> f32 {
        self.data[0]
    }

    /// Variance of y (element [1,1]).
    #[inline]
    pub fn var_y(&self) -> f32 {
        self.data[4]
    }

    /// Variance of theta (element [2,2]).
    #[inline]
    pub fn var_theta(&self) -> f32 {
        self.data[8]
    }

    /// Trace of the position block, a scalar "how lost are we" figure.
    #[inline]
    pub fn position_trace(&self) -> f32 {
        self.data[0] + self.data[4]
    }

    /// Get raw data as slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32; 9] {
        &self.data
    }

    /// True when every element is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Force exact symmetry and non-negative variances.
    ///
    /// Off-diagonal pairs are replaced by their mean; diagonal round-off
    /// below zero is clamped to zero.
    pub fn symmetrize(&mut self) {
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            let avg = 0.5 * (self.data[i * 3 + j] + self.data[j * 3 + i]);
            self.data[i * 3 + j] = avg;
            self.data[j * 3 + i] = avg;
        }
        for d in [0, 4, 8] {
            if self.data[d] < 0.0 {
                self.data[d] = 0.0;
            }
        }
    }

    /// Row-major matrix product `self · other`.
    pub fn matmul(&self, other: &Covariance2D) -> Covariance2D {
        let a = &self.data;
        let b = &other.data;
        let mut out = [0.0f32; 9];
        for r in 0..3 {
            for c in 0..3 {
                out[r * 3 + c] =
                    a[r * 3] * b[c] + a[r * 3 + 1] * b[3 + c] + a[r * 3 + 2] * b[6 + c];
            }
        }
        Covariance2D::from_array(out)
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Covariance2D {
        let d = &self.data;
        Covariance2D::from_array([d[0], d[3], d[6], d[1], d[4], d[7], d[2], d[5], d[8]])
    }

    /// Element-wise sum.
    pub fn plus(&self, other: &Covariance2D) -> Covariance2D {
        let mut out = self.data;
        for (o, b) in out.iter_mut().zip(other.data.iter()) {
            *o += b;
        }
        Covariance2D::from_array(out)
    }
}

impl Default for Covariance2D {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_covariance2d_accessors() {
        let zero = Covariance2D::zero();
        assert_eq!(zero.var_theta(), 0.0);

        let diag = Covariance2D::diagonal(0.1, 0.2, 0.05);
        assert_eq!(diag.var_x(), 0.1);
        assert_eq!(diag.var_y(), 0.2);
        assert_eq!(diag.var_theta(), 0.05);
        assert_relative_eq!(diag.position_trace(), 0.3);
    }

    #[test]
    fn test_symmetrize() {
        let mut c =
            Covariance2D::from_array([1.0, 0.2, 0.0, 0.4, 1.0, 0.1, 0.0, 0.3, -1e-9]);
        c.symmetrize();
        assert_relative_eq!(c.get(0, 1), 0.3, epsilon = 1e-6);
        assert_relative_eq!(c.get(1, 0), 0.3, epsilon = 1e-6);
        assert_relative_eq!(c.get(1, 2), 0.2, epsilon = 1e-6);
        assert_relative_eq!(c.get(2, 1), 0.2, epsilon = 1e-6);
        assert_eq!(c.var_theta(), 0.0);
    }

    #[test]
    fn test_mul_identity() {
        let a = Covariance2D::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(a.matmul(&Covariance2D::identity()), a);
        assert_eq!(Covariance2D::identity().matmul(&a), a);
    }

    #[test]
    fn test_transpose_and_add() {
        let a = Covariance2D::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let t = a.transpose();
        assert_eq!(t.get(0, 1), 4.0);
        assert_eq!(t.get(2, 0), 3.0);
        let s = a.plus(&t);
        assert_eq!(s.get(0, 1), s.get(1, 0));
    }
}
