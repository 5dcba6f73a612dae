// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Beam Transport
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Stepwise particle transport through an ordered element list.
//!
//! Each element is cut into `ceil(L / step)` slices; the last slice takes
//! the remainder. The slice map is applied to every particle and a
//! [`BeamSnapshot`] is appended to the beam history after each slice.

use crate::elements::BeamlineElement;
use beam_math::moments::PlaneMoments;
use beam_math::transfer::apply_transfer;
use beam_types::error::{BeamError, BeamResult};
use beam_types::state::{column, Beam, BeamSnapshot};
use ndarray::ArrayView1;
use tracing::{debug, info};

/// Slack when dividing an element length by the step, so 0.2 / 0.1 is 2 slices.
const SLICE_COUNT_TOLERANCE: f64 = 1e-9;

/// Upper bound on slices per element; beyond this the step is unusably small.
pub const MAX_SLICES_PER_ELEMENT: usize = 10_000_000;

/// Label of the snapshot taken at the line entry.
pub const ENTRY_LABEL: &str = "entry";

/// Slice lengths covering `length_m` with at most `step_m` each.
pub fn slice_lengths(length_m: f64, step_m: f64) -> BeamResult<Vec<f64>> {
    validate_step(step_m)?;
    if !length_m.is_finite() || length_m < 0.0 {
        return Err(BeamError::PhysicsViolation(format!(
            "element length must be finite and >= 0, got {length_m}"
        )));
    }
    if length_m == 0.0 {
        return Ok(Vec::new());
    }
    let n_f = (length_m / step_m - SLICE_COUNT_TOLERANCE).ceil().max(1.0);
    if !n_f.is_finite() || n_f > MAX_SLICES_PER_ELEMENT as f64 {
        return Err(BeamError::ConfigError(format!(
            "step {step_m} m cuts a {length_m} m element into more than \
             {MAX_SLICES_PER_ELEMENT} slices"
        )));
    }
    let n = n_f as usize;
    let mut slices = vec![step_m; n - 1];
    slices.push(length_m - step_m * (n - 1) as f64);
    Ok(slices)
}

fn validate_step(step_m: f64) -> BeamResult<()> {
    if !step_m.is_finite() || step_m <= 0.0 {
        return Err(BeamError::ConfigError(format!(
            "transport step must be finite and > 0, got {step_m}"
        )));
    }
    Ok(())
}

fn extrema(values: ArrayView1<f64>) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Centroid, rms size and extent of the beam at its current position.
pub fn snapshot(
    beam: &Beam,
    element_index: Option<usize>,
    element_name: &str,
) -> BeamResult<BeamSnapshot> {
    let mx = PlaneMoments::from_columns(&beam.coords, column::X, column::XP)?;
    let my = PlaneMoments::from_columns(&beam.coords, column::Y, column::YP)?;
    let (x_min_m, x_max_m) = extrema(beam.column(column::X));
    let (y_min_m, y_max_m) = extrema(beam.column(column::Y));
    Ok(BeamSnapshot {
        s_m: beam.s_m,
        element_index,
        element_name: element_name.to_string(),
        x_mean_m: mx.mean_q,
        y_mean_m: my.mean_q,
        x_rms_m: mx.rms_q(),
        y_rms_m: my.rms_q(),
        x_min_m,
        x_max_m,
        y_min_m,
        y_max_m,
    })
}

/// Transport `beam` through `elements` in place with slices of at most `step_m`.
///
/// On a `PhysicsViolation` the beam is left at the failing slice: coordinates,
/// `s_m` and history reflect every slice applied up to and including it.
pub fn transport_beam<E: BeamlineElement>(
    beam: &mut Beam,
    elements: &[E],
    step_m: f64,
) -> BeamResult<()> {
    validate_step(step_m)?;
    if elements.is_empty() {
        return Ok(());
    }
    if beam.is_empty() {
        return Err(BeamError::EmptyBeam);
    }
    if beam.history.is_empty() {
        let entry = snapshot(beam, None, ENTRY_LABEL)?;
        beam.history.push(entry);
    }

    let mut n_slices = 0usize;
    for (idx, element) in elements.iter().enumerate() {
        let slices = slice_lengths(element.length_m(), step_m)?;
        debug!(
            element = element.name(),
            kind = %element.kind(),
            length_m = element.length_m(),
            slices = slices.len(),
            "transporting through element"
        );

        // Only the last slice can differ in length; build the common map once.
        let Some(&common_m) = slices.first() else {
            continue;
        };
        let common_map = element.transfer_map(common_m, beam)?;
        for &slice_m in &slices {
            if slice_m == common_m {
                apply_transfer(&mut beam.coords.view_mut(), &common_map);
            } else {
                let map = element.transfer_map(slice_m, beam)?;
                apply_transfer(&mut beam.coords.view_mut(), &map);
            }
            beam.s_m += slice_m;

            if beam.coords.iter().any(|v| !v.is_finite()) {
                return Err(BeamError::PhysicsViolation(format!(
                    "particle coordinates became non-finite in element '{}' at s={:.6} m",
                    element.name(),
                    beam.s_m
                )));
            }
            let snap = snapshot(beam, Some(idx), element.name())?;
            beam.history.push(snap);
        }
        n_slices += slices.len();
    }

    if let Some(last) = beam.history.last() {
        info!(
            elements = elements.len(),
            slices = n_slices,
            s_m = beam.s_m,
            x_rms_m = last.x_rms_m,
            y_rms_m = last.y_rms_m,
            "beam transport complete"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beamline::Beamline;
    use crate::elements::{DriftTube, Element, QuadrupoleMagnet};
    use crate::particles::{RandomBeamBuilder, Species};
    use beam_math::moments::TwissParams;
    use beam_math::transfer::{quadrupole_planes, Transfer2};

    fn reference_beam() -> Beam {
        RandomBeamBuilder::new(Species::electron(), 10_000, 250.0e3)
            .horizontal(0.003, 1e-6, -0.5)
            .vertical(0.003, 1e-6, -0.5)
            .seed(42)
            .build()
            .unwrap()
    }

    fn reference_line() -> Beamline {
        let drift = DriftTube::new("drift", 0.2).unwrap();
        let quad = QuadrupoleMagnet::new("quadrupole", 0.5, 0.4).unwrap();
        Beamline::new(
            "beamline",
            vec![drift.clone().into(), quad.into(), drift.into()],
        )
    }

    fn twiss(beam: &Beam, q: usize, p: usize) -> TwissParams {
        let m = PlaneMoments::from_columns(&beam.coords, q, p).unwrap();
        TwissParams::from_moments(&m).unwrap()
    }

    #[test]
    fn test_slice_lengths_cover_element() {
        assert_eq!(slice_lengths(0.2, 0.1).unwrap().len(), 2);
        let slices = slice_lengths(0.5, 0.1).unwrap();
        assert_eq!(slices.len(), 5);
        assert!((slices.iter().sum::<f64>() - 0.5).abs() < 1e-12);

        let slices = slice_lengths(0.25, 0.1).unwrap();
        assert_eq!(slices.len(), 3);
        assert!((slices[2] - 0.05).abs() < 1e-12);

        let slices = slice_lengths(0.05, 0.1).unwrap();
        assert_eq!(slices, vec![0.05]);
    }

    #[test]
    fn test_tiny_step_is_config_error() {
        assert!(matches!(
            slice_lengths(0.2, 1e-300),
            Err(BeamError::ConfigError(_))
        ));
        assert!(matches!(
            slice_lengths(0.2, f64::MIN_POSITIVE),
            Err(BeamError::ConfigError(_))
        ));
        assert_eq!(slice_lengths(1.0, 1e-4).unwrap().len(), 10_000);

        let mut beam = reference_beam();
        let before = beam.coords.clone();
        let drift: Vec<Element> = vec![DriftTube::new("drift", 0.2).unwrap().into()];
        assert!(matches!(
            transport_beam(&mut beam, &drift, 1e-300),
            Err(BeamError::ConfigError(_))
        ));
        assert_eq!(beam.coords, before);
        assert_eq!(beam.s_m, 0.0);
    }

    #[test]
    fn test_invalid_step_is_config_error() {
        let mut beam = reference_beam();
        let line = reference_line();
        for step in [0.0, -0.1, f64::NAN] {
            assert!(matches!(
                transport_beam(&mut beam, line.elements(), step),
                Err(BeamError::ConfigError(_))
            ));
        }
    }

    #[test]
    fn test_reference_line_records_history() {
        let mut beam = reference_beam();
        let line = reference_line();
        transport_beam(&mut beam, line.elements(), 0.1).unwrap();

        // entry + 2 + 5 + 2 slices
        assert_eq!(beam.history.len(), 10);
        assert_eq!(beam.history[0].element_index, None);
        assert_eq!(beam.history[0].element_name, ENTRY_LABEL);
        assert_eq!(beam.history[3].element_name, "quadrupole");
        assert_eq!(beam.history[9].element_index, Some(2));
        assert!((beam.s_m - 0.9).abs() < 1e-12);
        assert!((beam.history[9].s_m - 0.9).abs() < 1e-12);
        for pair in beam.history.windows(2) {
            assert!(pair[1].s_m > pair[0].s_m);
        }
    }

    #[test]
    fn test_drift_conserves_emittance_and_follows_beta_function() {
        let mut beam = reference_beam();
        let t0 = twiss(&beam, column::X, column::XP);
        let drift: Vec<Element> = vec![DriftTube::new("drift", 0.5).unwrap().into()];
        transport_beam(&mut beam, &drift, 0.1).unwrap();
        let t1 = twiss(&beam, column::X, column::XP);

        assert!((t1.emittance - t0.emittance).abs() / t0.emittance < 1e-9);
        let s = 0.5;
        let beta_expected = t0.beta - 2.0 * t0.alpha * s + t0.gamma * s * s;
        assert!((t1.beta - beta_expected).abs() / beta_expected < 1e-9);
    }

    #[test]
    fn test_quadrupole_moments_follow_twiss_propagation() {
        let mut beam = reference_beam();
        let tx0 = twiss(&beam, column::X, column::XP);
        let ty0 = twiss(&beam, column::Y, column::YP);
        let line = reference_line();
        transport_beam(&mut beam, line.elements(), 0.1).unwrap();

        let (qx, qy) = quadrupole_planes(0.4, 0.5);
        let d = Transfer2::drift(0.2);
        let mx = d.compose(&qx).compose(&d);
        let my = d.compose(&qy).compose(&d);
        let tx_expected = tx0.propagate(&mx);
        let ty_expected = ty0.propagate(&my);
        let tx1 = twiss(&beam, column::X, column::XP);
        let ty1 = twiss(&beam, column::Y, column::YP);

        assert!((tx1.beta - tx_expected.beta).abs() / tx_expected.beta < 1e-8);
        assert!((tx1.alpha - tx_expected.alpha).abs() < 1e-8);
        assert!((ty1.beta - ty_expected.beta).abs() / ty_expected.beta < 1e-8);
        assert!((ty1.alpha - ty_expected.alpha).abs() < 1e-8);
    }

    #[test]
    fn test_step_size_does_not_change_linear_result() {
        let line = reference_line();
        let mut fine = reference_beam();
        let mut coarse = fine.clone();
        transport_beam(&mut fine, line.elements(), 0.01).unwrap();
        transport_beam(&mut coarse, line.elements(), 1.0).unwrap();
        assert_eq!(coarse.history.len(), 4);
        let max_diff = fine
            .coords
            .iter()
            .zip(coarse.coords.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(max_diff < 1e-12, "max diff {max_diff}");
    }

    #[test]
    fn test_empty_line_is_noop() {
        let mut beam = reference_beam();
        let before = beam.coords.clone();
        let empty: Vec<Element> = Vec::new();
        transport_beam(&mut beam, &empty, 0.1).unwrap();
        assert_eq!(beam.coords, before);
        assert!(beam.history.is_empty());
        assert_eq!(beam.s_m, 0.0);
    }

    #[test]
    fn test_second_pass_appends_to_history() {
        let mut beam = reference_beam();
        let line = reference_line();
        transport_beam(&mut beam, line.elements(), 0.1).unwrap();
        transport_beam(&mut beam, line.elements(), 0.1).unwrap();
        assert_eq!(beam.history.len(), 19);
        assert!((beam.s_m - 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_runaway_coordinates_raise_physics_violation() {
        let mut beam = reference_beam();
        let quad: Vec<Element> = vec![QuadrupoleMagnet::new("q", 0.5, -1.0e8).unwrap().into()];
        assert!(matches!(
            transport_beam(&mut beam, &quad, 0.1),
            Err(BeamError::PhysicsViolation(_))
        ));
        // the beam stays at the failing slice
        assert!(beam.s_m > 0.0);
        assert!(beam.coords.iter().any(|v| !v.is_finite()));
    }
}
