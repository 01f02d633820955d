//! Spectral data of integer matrices.

use nalgebra::{Complex, DMatrix, DVector};

use super::IntMatrix;
use crate::error::{GraphError, Result};

/// Tolerances for eigen computations.
#[derive(Clone, Copy, Debug)]
pub struct EigenCfg {
    /// Entries of the PF eigenvector below `tol` are clamped to zero;
    /// `tol.sqrt()` bounds the distance at which an eigenvalue counts as zero
    /// or as a root of unity.
    pub tol: f64,
}

impl Default for EigenCfg {
    fn default() -> Self {
        Self { tol: 1e-8 }
    }
}

impl EigenCfg {
    /// Defective eigenvalues of integer matrices are only accurate to about
    /// the square root of machine precision.
    pub(crate) fn unit_tol(&self) -> f64 {
        self.tol.sqrt()
    }
}

impl IntMatrix {
    /// Full complex spectrum (with multiplicity).
    pub fn eigenvalues(&self) -> Result<Vec<Complex<f64>>> {
        if self.n() == 0 {
            return Ok(Vec::new());
        }
        let ev: Vec<Complex<f64>> = self.to_f64().complex_eigenvalues().iter().copied().collect();
        if ev.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
            return Err(GraphError::Numerical("eigenvalues".into()));
        }
        Ok(ev)
    }

    /// Spectral radius; 1 for the empty matrix. Defined for reducible
    /// matrices too (the identity has growth rate 1).
    pub fn growth_rate(&self) -> Result<f64> {
        if self.n() == 0 {
            return Ok(1.0);
        }
        Ok(self
            .eigenvalues()?
            .iter()
            .map(|z| z.norm())
            .fold(0.0, f64::max))
    }

    /// Perron–Frobenius eigenvalue and a nonnegative unit eigenvector.
    /// Fails with `Invariant` on reducible matrices.
    pub fn eigen_pair(&self, cfg: EigenCfg) -> Result<(f64, DVector<f64>)> {
        if !self.is_irreducible() {
            return Err(GraphError::invariant("eigen_pair", "reducible matrix"));
        }
        let n = self.n();
        if n == 0 {
            return Ok((1.0, DVector::zeros(0)));
        }
        let lambda = self
            .eigenvalues()?
            .iter()
            .map(|z| z.re)
            .fold(f64::NEG_INFINITY, f64::max);

        let shifted = self.to_f64() - DMatrix::<f64>::identity(n, n) * lambda;
        let svd = shifted.svd(false, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| GraphError::Numerical("eigenvector (no V^T)".into()))?;
        let (k, _) = svd
            .singular_values
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, &s)| if s < best.1 { (i, s) } else { best });
        let mut v: DVector<f64> = v_t.row(k).transpose();
        if v.sum() < 0.0 {
            v.neg_mut();
        }
        for x in v.iter_mut() {
            if x.abs() < cfg.tol {
                *x = 0.0;
            }
        }
        if !lambda.is_finite() || v.iter().any(|x| !x.is_finite()) {
            return Err(GraphError::Numerical("eigen_pair".into()));
        }
        Ok((lambda, v))
    }
}
