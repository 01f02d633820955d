//! Integer matrices attached to graph maps.
//!
//! Purpose
//! - `IntMatrix`: square integer matrix (transition matrix, homology action)
//!   over `nalgebra::DMatrix<i64>`.
//! - Irreducibility, spectral radius, Perron–Frobenius eigenpair, and the
//!   reduced characteristic polynomial.
//! - Text exports (plain, Maple, Mathematica, MATLAB).
//!
//! Notes
//! - The 0×0 matrix (rank-0 maps) is irreducible with growth rate 1 and
//!   characteristic polynomial `1`.
//! - Eigen data comes from nalgebra's real Schur decomposition; the
//!   PF eigenvector is the SVD null vector of `M - λI`.

mod eigen;
mod export;
mod poly;

pub use eigen::EigenCfg;
pub use poly::poly_string;

use nalgebra::DMatrix;

/// Square integer matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntMatrix {
    pub a: DMatrix<i64>,
}

impl IntMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            a: DMatrix::zeros(n, n),
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            a: DMatrix::identity(n, n),
        }
    }

    /// Build from rows; every row must have `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<i64>]) -> Self {
        let n = rows.len();
        Self {
            a: DMatrix::from_fn(n, n, |i, j| rows[i].get(j).copied().unwrap_or(0)),
        }
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.a.nrows()
    }

    pub fn count_nonzero(&self) -> usize {
        self.a.iter().filter(|&&x| x != 0).count()
    }

    /// Strong connectivity of the incidence relation: the accumulated powers
    /// `M + M² + …` are summed until no new nonzero entry appears; the matrix
    /// is irreducible iff every entry is then nonzero.
    pub fn is_irreducible(&self) -> bool {
        let n = self.n();
        if n == 0 {
            return true;
        }
        // only the zero pattern matters, so keep entries in {0, 1}
        let pattern = self.a.map(|x| i64::from(x != 0));
        let mut iter = pattern.clone();
        let mut accu = pattern.clone();
        let mut old = usize::MAX;
        loop {
            let cnt = accu.iter().filter(|&&x| x != 0).count();
            if cnt == old {
                return cnt == n * n;
            }
            old = cnt;
            iter = (&iter * &pattern).map(|x| i64::from(x != 0));
            accu = (&accu + &iter).map(|x| i64::from(x != 0));
        }
    }

    pub(crate) fn to_f64(&self) -> DMatrix<f64> {
        self.a.map(|x| x as f64)
    }
}

#[cfg(test)]
mod tests;
