use super::*;
use proptest::prelude::*;

const PHI: f64 = 1.618_033_988_749_895;

fn golden() -> IntMatrix {
    IntMatrix::from_rows(&[vec![0, 1], vec![1, 1]])
}

#[test]
fn irreducibility_by_accumulated_powers() {
    assert!(golden().is_irreducible());
    assert!(IntMatrix::identity(1).is_irreducible());
    assert!(!IntMatrix::identity(2).is_irreducible());
    assert!(!IntMatrix::zeros(3).is_irreducible());
    // 3-cycle is irreducible but not primitive
    let cyc = IntMatrix::from_rows(&[vec![0, 1, 0], vec![0, 0, 1], vec![1, 0, 0]]);
    assert!(cyc.is_irreducible());
    // upper triangular is reducible
    let tri = IntMatrix::from_rows(&[vec![1, 1], vec![0, 1]]);
    assert!(!tri.is_irreducible());
}

#[test]
fn empty_matrix_is_defined() {
    let e = IntMatrix::zeros(0);
    assert!(e.is_irreducible());
    assert_eq!(e.growth_rate().unwrap(), 1.0);
    assert_eq!(e.reduced_char_poly(EigenCfg::default()).unwrap(), vec![1]);
    let (lambda, v) = e.eigen_pair(EigenCfg::default()).unwrap();
    assert_eq!(lambda, 1.0);
    assert_eq!(v.len(), 0);
}

#[test]
fn golden_growth_and_eigenvector() {
    let m = golden();
    assert!((m.growth_rate().unwrap() - PHI).abs() < 1e-9);
    let (lambda, v) = m.eigen_pair(EigenCfg::default()).unwrap();
    assert!((lambda - PHI).abs() < 1e-9);
    assert!(v.iter().all(|&x| x > 0.0));
    let mv = m.to_f64() * &v;
    assert!((mv - &v * lambda).norm() < 1e-9);
    // the second coordinate carries more weight
    assert!(v[1] > v[0]);
}

#[test]
fn identity_has_growth_one_and_no_eigen_pair() {
    let id = IntMatrix::identity(3);
    assert!((id.growth_rate().unwrap() - 1.0).abs() < 1e-12);
    let err = id.eigen_pair(EigenCfg::default()).unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::Invariant);
}

#[test]
fn reduced_char_poly_drops_roots_of_unity() {
    let cfg = EigenCfg::default();
    assert_eq!(golden().reduced_char_poly(cfg).unwrap(), vec![1, -1, -1]);
    assert_eq!(IntMatrix::identity(2).reduced_char_poly(cfg).unwrap(), vec![1]);
    let swap = IntMatrix::from_rows(&[vec![0, 1], vec![1, 0]]);
    assert_eq!(swap.reduced_char_poly(cfg).unwrap(), vec![1]);
    // block diagonal: golden block plus a 3-cycle
    let m = IntMatrix::from_rows(&[
        vec![0, 1, 0, 0, 0],
        vec![1, 1, 0, 0, 0],
        vec![0, 0, 0, 1, 0],
        vec![0, 0, 0, 0, 1],
        vec![0, 0, 1, 0, 0],
    ]);
    assert_eq!(m.reduced_char_poly(cfg).unwrap(), vec![1, -1, -1]);
    // nilpotent part is dropped as well
    let z = IntMatrix::from_rows(&[vec![2, 0], vec![0, 0]]);
    assert_eq!(z.reduced_char_poly(cfg).unwrap(), vec![1, -2]);
}

#[test]
fn poly_string_formats_signs_and_powers() {
    assert_eq!(poly_string(&[1, -1, -1]), "x^2-x-1");
    assert_eq!(poly_string(&[1, -3, 0, 1]), "x^3-3x^2+1");
    assert_eq!(poly_string(&[-1, 0]), "-x");
    assert_eq!(poly_string(&[1]), "1");
    assert_eq!(poly_string(&[2, 5]), "2x+5");
}

#[test]
fn exports_match_external_formats() {
    let m = golden();
    assert_eq!(m.to_string(), "2\n0 1 \n1 1 \n\n");
    assert_eq!(m.to_maple(), "linalg[matrix](2,2,[0,1,1,1])\n");
    assert_eq!(m.to_mathematica(), "{{0,1},{1,1}}\n");
    assert_eq!(m.to_matlab(), "[0 1; 1 1]\n");
}

#[test]
fn convolve_multiplies_polynomials() {
    use nalgebra::Complex;
    let c = |x: f64| Complex::new(x, 0.0);
    // (1 + x)(1 - x + x^2) = 1 + x^3
    let r = poly::convolve(&[c(1.0), c(1.0)], &[c(1.0), c(-1.0), c(1.0)]);
    let re: Vec<i64> = r.iter().map(|z| z.re.round() as i64).collect();
    assert_eq!(re, vec![1, 0, 0, 1]);
}

proptest! {
    #[test]
    fn positive_matrices_have_positive_pf_vector(
        n in 1usize..6,
        entries in prop::collection::vec(1i64..5, 36),
    ) {
        let rows: Vec<Vec<i64>> = (0..n).map(|i| entries[i * n..(i + 1) * n].to_vec()).collect();
        let m = IntMatrix::from_rows(&rows);
        prop_assert!(m.is_irreducible());
        let (lambda, v) = m.eigen_pair(EigenCfg::default()).unwrap();
        prop_assert!(v.iter().all(|&x| x > 0.0));
        let resid = m.to_f64() * &v - &v * lambda;
        prop_assert!(resid.norm() < 1e-6 * lambda.max(1.0));
        prop_assert!((m.growth_rate().unwrap() - lambda).abs() < 1e-6 * lambda);
    }
}
