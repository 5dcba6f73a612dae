// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Property-Based Tests (proptest) for beam-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for beam-math using proptest.
//!
//! Covers: symplecticity of 2x2 blocks, slice composition, Twiss
//! propagation invariants, 6x6 map application.

use beam_math::moments::TwissParams;
use beam_math::transfer::{apply_transfer, quadrupole_planes, transfer_6d, Transfer2};
use ndarray::Array2;
use proptest::prelude::*;

fn max_abs_diff(a: &Transfer2, b: &Transfer2) -> f64 {
    let mut worst: f64 = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            worst = worst.max((a.0[i][j] - b.0[i][j]).abs());
        }
    }
    worst
}

// ── Transfer blocks ──────────────────────────────────────────────────

proptest! {
    /// Every quadrupole block has unit determinant.
    #[test]
    fn quadrupole_blocks_are_symplectic(k1 in -50.0f64..50.0, l in 1e-3f64..1.0) {
        let (mx, my) = quadrupole_planes(k1, l);
        prop_assert!((mx.det() - 1.0).abs() < 1e-9, "det x {}", mx.det());
        prop_assert!((my.det() - 1.0).abs() < 1e-9, "det y {}", my.det());
    }

    /// Two consecutive slices compose to the map of their summed length.
    #[test]
    fn slices_compose_to_full_element(
        k1 in -20.0f64..20.0,
        l1 in 1e-3f64..0.5,
        l2 in 1e-3f64..0.5,
    ) {
        let (ax, ay) = quadrupole_planes(k1, l1);
        let (bx, by) = quadrupole_planes(k1, l2);
        let (fx, fy) = quadrupole_planes(k1, l1 + l2);
        prop_assert!(max_abs_diff(&bx.compose(&ax), &fx) < 1e-9);
        prop_assert!(max_abs_diff(&by.compose(&ay), &fy) < 1e-9);
    }

    /// Drifts add lengths.
    #[test]
    fn drifts_compose_additively(l1 in 0.0f64..5.0, l2 in 0.0f64..5.0) {
        let joined = Transfer2::drift(l2).compose(&Transfer2::drift(l1));
        prop_assert!(max_abs_diff(&joined, &Transfer2::drift(l1 + l2)) < 1e-12);
    }
}

// ── Twiss propagation ────────────────────────────────────────────────

proptest! {
    /// beta*gamma - alpha^2 = 1 is kept through any symplectic block.
    #[test]
    fn twiss_invariant_preserved(
        beta in 0.1f64..50.0,
        eps in 1e-8f64..1e-5,
        alpha in -3.0f64..3.0,
        k1 in -10.0f64..10.0,
        l in 1e-2f64..1.0,
    ) {
        let t0 = TwissParams::from_size((beta * eps).sqrt(), eps, alpha).unwrap();
        let (mx, _) = quadrupole_planes(k1, l);
        let t1 = t0.propagate(&mx);
        let invariant = t1.beta * t1.gamma - t1.alpha * t1.alpha;
        let scale = 1.0 + t1.alpha * t1.alpha;
        prop_assert!((invariant - 1.0).abs() < 1e-9 * scale, "invariant {}", invariant);
        prop_assert!(t1.beta > 0.0);
        prop_assert_eq!(t1.emittance, eps);
    }

    /// from_size reproduces the requested rms size.
    #[test]
    fn from_size_roundtrips_sigma(
        sigma in 1e-5f64..1e-1,
        eps in 1e-9f64..1e-4,
        alpha in -5.0f64..5.0,
    ) {
        let t = TwissParams::from_size(sigma, eps, alpha).unwrap();
        prop_assert!((t.sigma() - sigma).abs() / sigma < 1e-12);
    }
}

// ── 6x6 maps ─────────────────────────────────────────────────────────

proptest! {
    /// The 6x6 map acts on each plane exactly like its 2x2 block.
    #[test]
    fn six_d_map_matches_blocks(
        k1 in -10.0f64..10.0,
        l in 1e-2f64..1.0,
        r56 in -1.0f64..1.0,
        row in proptest::array::uniform6(-1e-2f64..1e-2),
    ) {
        let (mx, my) = quadrupole_planes(k1, l);
        let map = transfer_6d(&mx, &my, r56);
        let mut coords = Array2::from_shape_vec((1, 6), row.to_vec()).unwrap();
        apply_transfer(&mut coords.view_mut(), &map);

        let (x, xp) = mx.apply(row[0], row[1]);
        let (y, yp) = my.apply(row[2], row[3]);
        let expected = [x, xp, y, yp, row[4] + r56 * row[5], row[5]];
        for (got, want) in coords.row(0).iter().zip(expected.iter()) {
            prop_assert!((got - want).abs() < 1e-12);
        }
    }
}
