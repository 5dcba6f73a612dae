// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Beamline Elements
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear beamline elements: drift tubes and thick quadrupole magnets.

use beam_math::transfer::{quadrupole_planes, transfer_6d, Transfer2};
use beam_types::config::ElementConfig;
use beam_types::error::{BeamError, BeamResult};
use beam_types::state::Beam;
use ndarray::Array2;
use std::fmt;

/// Element family, used for labelling outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Drift,
    Quadrupole,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Drift => "drift",
            ElementKind::Quadrupole => "quadrupole",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A segment of the line that maps phase space linearly over its length.
pub trait BeamlineElement {
    fn name(&self) -> &str;
    fn length_m(&self) -> f64;
    fn kind(&self) -> ElementKind;

    /// 6x6 map of a slice of this element of length `slice_m`.
    fn transfer_map(&self, slice_m: f64, beam: &Beam) -> BeamResult<Array2<f64>>;
}

fn validate_length(length_m: f64, name: &str) -> BeamResult<()> {
    if !length_m.is_finite() || length_m <= 0.0 {
        return Err(BeamError::PhysicsViolation(format!(
            "element '{name}' length must be finite and > 0, got {length_m}"
        )));
    }
    Ok(())
}

fn validate_slice(slice_m: f64, name: &str) -> BeamResult<()> {
    if !slice_m.is_finite() || slice_m < 0.0 {
        return Err(BeamError::PhysicsViolation(format!(
            "slice length for '{name}' must be finite and >= 0, got {slice_m}"
        )));
    }
    Ok(())
}

/// Longitudinal slip of an off-momentum particle: R56 = L / (beta gamma)^2.
fn r56(slice_m: f64, beam: &Beam) -> f64 {
    let bg = beam.beta() * beam.gamma();
    slice_m / (bg * bg)
}

/// Field-free drift tube.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftTube {
    name: String,
    length_m: f64,
}

impl DriftTube {
    pub fn new(name: &str, length_m: f64) -> BeamResult<Self> {
        validate_length(length_m, name)?;
        Ok(DriftTube {
            name: name.to_string(),
            length_m,
        })
    }
}

impl BeamlineElement for DriftTube {
    fn name(&self) -> &str {
        &self.name
    }

    fn length_m(&self) -> f64 {
        self.length_m
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Drift
    }

    fn transfer_map(&self, slice_m: f64, beam: &Beam) -> BeamResult<Array2<f64>> {
        validate_slice(slice_m, &self.name)?;
        let d = Transfer2::drift(slice_m);
        Ok(transfer_6d(&d, &d, r56(slice_m, beam)))
    }
}

/// Thick quadrupole with normalised strength k1 [m^-2].
///
/// Positive `strength` focuses in x and defocuses in y.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadrupoleMagnet {
    name: String,
    length_m: f64,
    strength: f64,
}

impl QuadrupoleMagnet {
    pub fn new(name: &str, length_m: f64, strength: f64) -> BeamResult<Self> {
        validate_length(length_m, name)?;
        if !strength.is_finite() {
            return Err(BeamError::PhysicsViolation(format!(
                "quadrupole '{name}' strength must be finite"
            )));
        }
        Ok(QuadrupoleMagnet {
            name: name.to_string(),
            length_m,
            strength,
        })
    }

    /// Build from a field gradient G [T/m]: k1 = sign(q) * G / (B rho).
    pub fn from_gradient(
        name: &str,
        length_m: f64,
        gradient_t_m: f64,
        beam: &Beam,
    ) -> BeamResult<Self> {
        if !gradient_t_m.is_finite() {
            return Err(BeamError::PhysicsViolation(format!(
                "quadrupole '{name}' gradient must be finite"
            )));
        }
        let sign = f64::from(beam.species.charge_number.signum());
        let k1 = sign * gradient_t_m / beam.rigidity_t_m();
        Self::new(name, length_m, k1)
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }
}

impl BeamlineElement for QuadrupoleMagnet {
    fn name(&self) -> &str {
        &self.name
    }

    fn length_m(&self) -> f64 {
        self.length_m
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Quadrupole
    }

    fn transfer_map(&self, slice_m: f64, beam: &Beam) -> BeamResult<Array2<f64>> {
        validate_slice(slice_m, &self.name)?;
        let (mx, my) = quadrupole_planes(self.strength, slice_m);
        Ok(transfer_6d(&mx, &my, r56(slice_m, beam)))
    }
}

/// Any element that can be placed in a [`crate::beamline::Beamline`].
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Drift(DriftTube),
    Quadrupole(QuadrupoleMagnet),
}

impl Element {
    pub fn from_config(config: &ElementConfig) -> BeamResult<Self> {
        match config {
            ElementConfig::Drift { name, length_m } => {
                Ok(Element::Drift(DriftTube::new(name, *length_m)?))
            }
            ElementConfig::Quadrupole {
                name,
                length_m,
                strength,
            } => Ok(Element::Quadrupole(QuadrupoleMagnet::new(
                name, *length_m, *strength,
            )?)),
        }
    }

    fn inner(&self) -> &dyn BeamlineElement {
        match self {
            Element::Drift(d) => d as &dyn BeamlineElement,
            Element::Quadrupole(q) => q,
        }
    }
}

impl BeamlineElement for Element {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn length_m(&self) -> f64 {
        self.inner().length_m()
    }

    fn kind(&self) -> ElementKind {
        self.inner().kind()
    }

    fn transfer_map(&self, slice_m: f64, beam: &Beam) -> BeamResult<Array2<f64>> {
        self.inner().transfer_map(slice_m, beam)
    }
}

impl From<DriftTube> for Element {
    fn from(d: DriftTube) -> Self {
        Element::Drift(d)
    }
}

impl From<QuadrupoleMagnet> for Element {
    fn from(q: QuadrupoleMagnet) -> Self {
        Element::Quadrupole(q)
    }
}
