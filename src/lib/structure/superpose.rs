//! Optimal superposition RMSD between equal-length coordinate windows.
//!
//! Uses the quaternion characteristic polynomial (QCP) method: the minimal
//! RMSD is obtained from the largest eigenvalue of the quaternion key
//! matrix, found by Newton-Raphson on its characteristic polynomial. No
//! rotation matrix is ever materialized, which keeps classification cheap
//! when a window is compared against every fragment in a library.

use crate::structure::Coords;

/// Convergence tolerance for the Newton-Raphson eigenvalue iteration.
const EIGEN_TOLERANCE: f64 = 1e-11;

/// Iteration cap; in practice convergence takes a handful of steps.
const MAX_ITERATIONS: usize = 50;

/// Returns the minimal RMSD between two coordinate windows after optimal
/// rigid-body superposition.
///
/// # Panics
/// Panics if the windows are empty or have different lengths; windows
/// compared during classification always share the fragment size.
#[must_use]
pub fn rmsd(a: &[Coords], b: &[Coords]) -> f64 {
    assert!(!a.is_empty(), "cannot superpose empty windows");
    assert_eq!(a.len(), b.len(), "cannot superpose windows of different lengths");
    let n = a.len() as f64;

    let centered_a = center(a);
    let centered_b = center(b);

    // Inner products of both windows and the 3x3 cross-correlation matrix.
    let mut inner = 0.0;
    let mut s = [[0.0f64; 3]; 3];
    for (pa, pb) in centered_a.iter().zip(&centered_b) {
        for i in 0..3 {
            inner += pa[i] * pa[i] + pb[i] * pb[i];
            for j in 0..3 {
                s[i][j] += pa[i] * pb[j];
            }
        }
    }
    let e0 = inner * 0.5;

    let (sxx, sxy, sxz) = (s[0][0], s[0][1], s[0][2]);
    let (syx, syy, syz) = (s[1][0], s[1][1], s[1][2]);
    let (szx, szy, szz) = (s[2][0], s[2][1], s[2][2]);

    let sxx2 = sxx * sxx;
    let syy2 = syy * syy;
    let szz2 = szz * szz;
    let sxy2 = sxy * sxy;
    let syz2 = syz * syz;
    let sxz2 = sxz * sxz;
    let syx2 = syx * syx;
    let szy2 = szy * szy;
    let szx2 = szx * szx;

    let syz_szy_m_syy_szz2 = 2.0 * (syz * szy - syy * szz);
    let sxx2_syy2_szz2_syz2_szy2 = syy2 + szz2 - sxx2 + syz2 + szy2;

    let c2 = -2.0 * (sxx2 + syy2 + szz2 + sxy2 + syx2 + sxz2 + szx2 + syz2 + szy2);
    let c1 = 8.0
        * (sxx * syz * szy + syy * szx * sxz + szz * sxy * syx
            - sxx * syy * szz
            - syz * szx * sxy
            - szy * syx * sxz);

    let sxz_p_szx = sxz + szx;
    let syz_p_szy = syz + szy;
    let sxy_p_syx = sxy + syx;
    let syz_m_szy = syz - szy;
    let sxz_m_szx = sxz - szx;
    let sxy_m_syx = sxy - syx;
    let sxx_p_syy = sxx + syy;
    let sxx_m_syy = sxx - syy;
    let sxy2_sxz2_syx2_szx2 = sxy2 + sxz2 - syx2 - szx2;

    let c0 = sxy2_sxz2_syx2_szx2 * sxy2_sxz2_syx2_szx2
        + (sxx2_syy2_szz2_syz2_szy2 + syz_szy_m_syy_szz2)
            * (sxx2_syy2_szz2_syz2_szy2 - syz_szy_m_syy_szz2)
        + (-sxz_p_szx * syz_m_szy + sxy_m_syx * (sxx_m_syy - szz))
            * (-sxz_m_szx * syz_p_szy + sxy_m_syx * (sxx_m_syy + szz))
        + (-sxz_p_szx * syz_p_szy - sxy_p_syx * (sxx_p_syy - szz))
            * (-sxz_m_szx * syz_m_szy - sxy_p_syx * (sxx_p_syy + szz))
        + (sxy_p_syx * syz_p_szy + sxz_p_szx * (sxx_m_syy + szz))
            * (-sxy_m_syx * syz_m_szy + sxz_p_szx * (sxx_p_syy + szz))
        + (sxy_p_syx * syz_m_szy + sxz_m_szx * (sxx_m_syy - szz))
            * (-sxy_m_syx * syz_p_szy + sxz_m_szx * (sxx_p_syy - szz));

    // Newton-Raphson on the characteristic polynomial, started at the upper
    // bound E0 which is tight for well-superposable windows.
    let mut eigen = e0;
    for _ in 0..MAX_ITERATIONS {
        let previous = eigen;
        let x2 = eigen * eigen;
        let b = (x2 + c2) * eigen;
        let a = b + c1;
        let denom = 2.0 * x2 * eigen + b + a;
        if denom.abs() < f64::EPSILON {
            break;
        }
        eigen -= (a * eigen + c0) / denom;
        if (eigen - previous).abs() < (EIGEN_TOLERANCE * eigen).abs() {
            break;
        }
    }

    ((2.0 * (e0 - eigen)).abs() / n).sqrt()
}

fn center(points: &[Coords]) -> Vec<Coords> {
    let n = points.len() as f64;
    let mut centroid = [0.0f64; 3];
    for p in points {
        for i in 0..3 {
            centroid[i] += p[i];
        }
    }
    for c in &mut centroid {
        *c /= n;
    }
    points
        .iter()
        .map(|p| [p[0] - centroid[0], p[1] - centroid[1], p[2] - centroid[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn helixish() -> Vec<Coords> {
        (0..6)
            .map(|i| {
                let t = i as f64 * 0.7;
                [t.cos() * 2.3, t.sin() * 2.3, i as f64 * 1.5]
            })
            .collect()
    }

    #[test]
    fn test_identical_windows_have_zero_rmsd() {
        let a = helixish();
        assert!(rmsd(&a, &a) < TOLERANCE);
    }

    #[test]
    fn test_translation_invariance() {
        let a = helixish();
        let b: Vec<Coords> = a.iter().map(|p| [p[0] + 11.0, p[1] - 4.0, p[2] + 0.5]).collect();
        assert!(rmsd(&a, &b) < TOLERANCE);
    }

    #[test]
    fn test_rotation_invariance() {
        let a = helixish();
        // Rotate 90 degrees about z.
        let b: Vec<Coords> = a.iter().map(|p| [-p[1], p[0], p[2]]).collect();
        assert!(rmsd(&a, &b) < TOLERANCE);
    }

    #[test]
    fn test_symmetry() {
        let a = helixish();
        let b: Vec<Coords> = a.iter().map(|p| [p[0] * 1.2, p[1], p[2]]).collect();
        assert!((rmsd(&a, &b) - rmsd(&b, &a)).abs() < TOLERANCE);
    }

    #[test]
    fn test_known_two_point_case() {
        // Segments of length 1 and 2 on the x axis: after centering, the
        // optimal overlay leaves each endpoint 0.5 away, so RMSD is 0.5.
        let a = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let b = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        assert!((rmsd(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_shapes_have_positive_rmsd() {
        let a = helixish();
        let b: Vec<Coords> = (0..6).map(|i| [i as f64 * 3.8, 0.0, 0.0]).collect();
        assert!(rmsd(&a, &b) > 0.5);
    }

    #[test]
    #[should_panic(expected = "different lengths")]
    fn test_length_mismatch_panics() {
        let a = helixish();
        rmsd(&a, &a[..3]);
    }
}
