//! Reduced characteristic polynomial.
//!
//! The characteristic polynomial is rebuilt from the spectrum with the
//! factors for zero eigenvalues and roots of unity left out; what remains
//! is the part carrying the growth rate. Products of linear factors are
//! formed by FFT convolution.

use std::f64::consts::PI;

use nalgebra::Complex;

use super::{EigenCfg, IntMatrix};
use crate::error::{GraphError, Result};

type C64 = Complex<f64>;

impl IntMatrix {
    /// Integer coefficients, leading coefficient first. The empty product is
    /// `[1]`.
    pub fn reduced_char_poly(&self, cfg: EigenCfg) -> Result<Vec<i64>> {
        let n = self.n();
        let ut = cfg.unit_tol();
        let max_order = 2 * n * n + 2;
        let mut p: Vec<C64> = vec![C64::new(1.0, 0.0)];
        for lambda in self.eigenvalues()? {
            if lambda.norm() < ut || is_root_of_unity(lambda, max_order, ut) {
                continue;
            }
            // coefficients lowest degree first: x - λ
            p = convolve(&p, &[-lambda, C64::new(1.0, 0.0)]);
        }
        if p.iter().any(|z| !z.re.is_finite()) {
            return Err(GraphError::Numerical("characteristic polynomial".into()));
        }
        Ok(p.iter().rev().map(|z| z.re.round() as i64).collect())
    }
}

fn is_root_of_unity(z: C64, max_order: usize, tol: f64) -> bool {
    if (z.norm() - 1.0).abs() >= tol {
        return false;
    }
    let mut w = z;
    for _ in 0..max_order {
        if (w - C64::new(1.0, 0.0)).norm() < tol {
            return true;
        }
        w *= z;
    }
    false
}

/// Linear convolution of two coefficient vectors.
pub(crate) fn convolve(p: &[C64], q: &[C64]) -> Vec<C64> {
    if p.is_empty() || q.is_empty() {
        return Vec::new();
    }
    let len = p.len() + q.len() - 1;
    let m = len.next_power_of_two();
    let mut a = p.to_vec();
    let mut b = q.to_vec();
    a.resize(m, C64::new(0.0, 0.0));
    b.resize(m, C64::new(0.0, 0.0));
    fft(&mut a, false);
    fft(&mut b, false);
    for (x, y) in a.iter_mut().zip(&b) {
        *x *= *y;
    }
    fft(&mut a, true);
    a.truncate(len);
    a
}

/// In-place iterative radix-2 FFT; `a.len()` must be a power of two.
fn fft(a: &mut [C64], invert: bool) {
    let n = a.len();
    if n <= 1 {
        return;
    }
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            a.swap(i, j);
        }
    }
    let mut len = 2;
    while len <= n {
        let ang = 2.0 * PI / len as f64 * if invert { -1.0 } else { 1.0 };
        let wlen = C64::new(ang.cos(), ang.sin());
        for chunk in a.chunks_mut(len) {
            let mut w = C64::new(1.0, 0.0);
            let (lo, hi) = chunk.split_at_mut(len / 2);
            for (u, v) in lo.iter_mut().zip(hi.iter_mut()) {
                let t = *v * w;
                *v = *u - t;
                *u += t;
                w *= wlen;
            }
        }
        len <<= 1;
    }
    if invert {
        let scale = 1.0 / n as f64;
        for x in a.iter_mut() {
            *x *= scale;
        }
    }
}

/// Human-readable polynomial, e.g. `x^2-x-1`; coefficients leading first.
pub fn poly_string(p: &[i64]) -> String {
    let mut s = String::new();
    let deg = p.len().saturating_sub(1);
    for (i, &c) in p.iter().enumerate() {
        let d = deg - i;
        if c == 0 {
            continue;
        }
        let mut a = c;
        if !s.is_empty() {
            if a > 0 {
                s.push('+');
            } else {
                s.push('-');
                a = -a;
            }
        }
        if d > 0 {
            if a == -1 {
                s.push('-');
            } else if a != 1 {
                s.push_str(&a.to_string());
            }
            s.push('x');
            if d > 1 {
                s.push('^');
                s.push_str(&d.to_string());
            }
        } else {
            s.push_str(&a.to_string());
        }
    }
    s
}
