//! Linear transfer maps for beamline elements.
//!
//! 2x2 per-plane blocks (drift, thick quadrupole, thin lens) and the
//! block-diagonal 6x6 map acting on `(x, x', y, y', z, delta)` rows.

use ndarray::{Array2, ArrayViewMut2};

/// Below this |k1 L^2| a quadrupole block is evaluated as a drift.
const MIN_FOCUSING_PHASE: f64 = 1e-12;

/// 2x2 transfer matrix for one transverse plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer2(pub [[f64; 2]; 2]);

impl Transfer2 {
    pub fn identity() -> Self {
        Transfer2([[1.0, 0.0], [0.0, 1.0]])
    }

    /// Field-free drift of length `l`.
    pub fn drift(l: f64) -> Self {
        Transfer2([[1.0, l], [0.0, 1.0]])
    }

    /// Focusing thick quadrupole, `k > 0` [m^-2].
    pub fn quad_focusing(k: f64, l: f64) -> Self {
        let w = k.abs().sqrt();
        let phi = w * l;
        Transfer2([[phi.cos(), phi.sin() / w], [-w * phi.sin(), phi.cos()]])
    }

    /// Defocusing thick quadrupole, `k > 0` [m^-2].
    pub fn quad_defocusing(k: f64, l: f64) -> Self {
        let w = k.abs().sqrt();
        let phi = w * l;
        Transfer2([[phi.cosh(), phi.sinh() / w], [w * phi.sinh(), phi.cosh()]])
    }

    /// Thin lens with integrated strength `kl` [m^-1]; positive focuses.
    pub fn thin(kl: f64) -> Self {
        Transfer2([[1.0, 0.0], [-kl, 1.0]])
    }

    /// `self` applied after `first`: returns `self * first`.
    pub fn compose(&self, first: &Transfer2) -> Transfer2 {
        let a = &self.0;
        let b = &first.0;
        Transfer2([
            [
                a[0][0] * b[0][0] + a[0][1] * b[1][0],
                a[0][0] * b[0][1] + a[0][1] * b[1][1],
            ],
            [
                a[1][0] * b[0][0] + a[1][1] * b[1][0],
                a[1][0] * b[0][1] + a[1][1] * b[1][1],
            ],
        ])
    }

    pub fn det(&self) -> f64 {
        let m = &self.0;
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    /// Apply to a single `(q, p)` pair.
    pub fn apply(&self, q: f64, p: f64) -> (f64, f64) {
        let m = &self.0;
        (m[0][0] * q + m[0][1] * p, m[1][0] * q + m[1][1] * p)
    }
}

/// Horizontal and vertical blocks of a thick quadrupole with strength `k1`.
///
/// `k1 > 0` focuses x and defocuses y; `k1 < 0` the reverse.
pub fn quadrupole_planes(k1: f64, l: f64) -> (Transfer2, Transfer2) {
    if (k1 * l * l).abs() < MIN_FOCUSING_PHASE {
        let d = Transfer2::drift(l);
        return (d, d);
    }
    if k1 > 0.0 {
        (Transfer2::quad_focusing(k1, l), Transfer2::quad_defocusing(k1, l))
    } else {
        (Transfer2::quad_defocusing(k1, l), Transfer2::quad_focusing(k1, l))
    }
}

/// Block-diagonal 6x6 map from the two transverse blocks and the R56 term.
pub fn transfer_6d(mx: &Transfer2, my: &Transfer2, r56: f64) -> Array2<f64> {
    let mut m = Array2::zeros((6, 6));
    for (offset, block) in [(0usize, mx), (2usize, my)] {
        for i in 0..2 {
            for j in 0..2 {
                m[[offset + i, offset + j]] = block.0[i][j];
            }
        }
    }
    m[[4, 4]] = 1.0;
    m[[4, 5]] = r56;
    m[[5, 5]] = 1.0;
    m
}

/// Apply a 6x6 map to every row of an `(n, 6)` coordinate array in place.
pub fn apply_transfer(coords: &mut ArrayViewMut2<f64>, map: &Array2<f64>) {
    let updated = coords.dot(&map.t());
    coords.assign(&updated);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: &Transfer2, b: &Transfer2, tol: f64) {
        for i in 0..2 {
            for j in 0..2 {
                assert!(
                    (a.0[i][j] - b.0[i][j]).abs() < tol,
                    "mismatch at ({i},{j}): {} vs {}",
                    a.0[i][j],
                    b.0[i][j]
                );
            }
        }
    }

    #[test]
    fn test_drift_moves_position_by_angle_times_length() {
        let (x, xp) = Transfer2::drift(0.2).apply(1e-3, 2e-3);
        assert!((x - 1.4e-3).abs() < 1e-15);
        assert!((xp - 2e-3).abs() < 1e-15);
    }

    #[test]
    fn test_quadrupole_blocks_are_symplectic() {
        for &k in &[0.4, -0.4, 25.0, -212.0] {
            let (mx, my) = quadrupole_planes(k, 0.5);
            assert!((mx.det() - 1.0).abs() < 1e-9, "det(mx)={}", mx.det());
            assert!((my.det() - 1.0).abs() < 1e-9, "det(my)={}", my.det());
        }
    }

    #[test]
    fn test_slices_compose_to_full_quadrupole() {
        let k = 0.4;
        let full = Transfer2::quad_focusing(k, 0.5);
        let mut acc = Transfer2::identity();
        for &l in &[0.1, 0.1, 0.1, 0.1, 0.1] {
            acc = Transfer2::quad_focusing(k, l).compose(&acc);
        }
        assert_close(&acc, &full, 1e-12);
    }

    #[test]
    fn test_zero_strength_reduces_to_drift() {
        let (mx, my) = quadrupole_planes(0.0, 0.5);
        assert_eq!(mx, Transfer2::drift(0.5));
        assert_eq!(my, Transfer2::drift(0.5));
    }

    #[test]
    fn test_thick_quad_approaches_thin_lens() {
        let k = 2.0;
        let l = 1e-4;
        // Drift(-l/2) * Quad * Drift(-l/2) ~ thin lens with kl
        let quad = Transfer2::quad_focusing(k, l);
        let half_back = Transfer2::drift(-l / 2.0);
        let centred = half_back.compose(&quad).compose(&half_back);
        assert_close(&centred, &Transfer2::thin(k * l), 1e-8);
    }

    #[test]
    fn test_transfer_6d_layout_and_application() {
        let mx = Transfer2::drift(2.0);
        let my = Transfer2::thin(0.5);
        let map = transfer_6d(&mx, &my, 0.3);
        let mut coords = array![[1.0, 0.5, 2.0, 0.0, 0.0, 0.1]];
        apply_transfer(&mut coords.view_mut(), &map);
        let expected = [2.0, 0.5, 2.0, -1.0, 0.03, 0.1];
        for (got, want) in coords.row(0).iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }
}
