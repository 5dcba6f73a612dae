// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    ALPHA_REST_ENERGY_EV, C_LIGHT, ELECTRON_REST_ENERGY_EV, PROTON_REST_ENERGY_EV,
};
use crate::error::{BeamError, BeamResult};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Phase-space column layout of [`Beam::coords`].
pub mod column {
    /// Horizontal offset [m]
    pub const X: usize = 0;
    /// Horizontal divergence [rad]
    pub const XP: usize = 1;
    /// Vertical offset [m]
    pub const Y: usize = 2;
    /// Vertical divergence [rad]
    pub const YP: usize = 3;
    /// Longitudinal offset from the reference particle [m]
    pub const Z: usize = 4;
    /// Relative momentum deviation dp/p
    pub const DELTA: usize = 5;
}

/// Number of phase-space coordinates carried per particle.
pub const PHASE_SPACE_DIM: usize = 6;

/// Particle species carried by a beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub rest_energy_ev: f64,
    /// Charge in units of the elementary charge (signed).
    pub charge_number: i32,
}

impl Species {
    pub fn electron() -> Self {
        Self::named("electron", ELECTRON_REST_ENERGY_EV, -1)
    }

    pub fn positron() -> Self {
        Self::named("positron", ELECTRON_REST_ENERGY_EV, 1)
    }

    pub fn proton() -> Self {
        Self::named("proton", PROTON_REST_ENERGY_EV, 1)
    }

    pub fn antiproton() -> Self {
        Self::named("antiproton", PROTON_REST_ENERGY_EV, -1)
    }

    pub fn alpha() -> Self {
        Self::named("alpha", ALPHA_REST_ENERGY_EV, 2)
    }

    fn named(name: &str, rest_energy_ev: f64, charge_number: i32) -> Self {
        Species {
            name: name.to_string(),
            rest_energy_ev,
            charge_number,
        }
    }

    /// Look up a species by name (case-insensitive).
    pub fn from_name(name: &str) -> BeamResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "electron" | "e-" => Ok(Self::electron()),
            "positron" | "e+" => Ok(Self::positron()),
            "proton" | "p" => Ok(Self::proton()),
            "antiproton" => Ok(Self::antiproton()),
            "alpha" | "he4" => Ok(Self::alpha()),
            other => Err(BeamError::ConfigError(format!(
                "unknown particle species '{other}'"
            ))),
        }
    }
}

/// Beam statistics recorded at one longitudinal position during transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSnapshot {
    pub s_m: f64,
    /// Index of the element whose slice ended here; `None` at the line entry.
    pub element_index: Option<usize>,
    pub element_name: String,
    pub x_mean_m: f64,
    pub y_mean_m: f64,
    pub x_rms_m: f64,
    pub y_rms_m: f64,
    pub x_min_m: f64,
    pub x_max_m: f64,
    pub y_min_m: f64,
    pub y_max_m: f64,
}

/// Particle ensemble in 6D phase space.
#[derive(Debug, Clone)]
pub struct Beam {
    pub species: Species,
    pub kinetic_energy_ev: f64,
    pub coords: Array2<f64>, // [n, 6], columns per `column`
    /// Longitudinal position of the reference particle along the line [m].
    pub s_m: f64,
    pub history: Vec<BeamSnapshot>,
}

impl Beam {
    pub fn new(species: Species, kinetic_energy_ev: f64, coords: Array2<f64>) -> BeamResult<Self> {
        if !kinetic_energy_ev.is_finite() || kinetic_energy_ev <= 0.0 {
            return Err(BeamError::PhysicsViolation(format!(
                "kinetic_energy_ev must be finite and > 0, got {kinetic_energy_ev}"
            )));
        }
        if !species.rest_energy_ev.is_finite() || species.rest_energy_ev <= 0.0 {
            return Err(BeamError::PhysicsViolation(format!(
                "species '{}' rest energy must be finite and > 0",
                species.name
            )));
        }
        if species.charge_number == 0 {
            return Err(BeamError::PhysicsViolation(format!(
                "species '{}' must be charged",
                species.name
            )));
        }
        if coords.ncols() != PHASE_SPACE_DIM {
            return Err(BeamError::PhysicsViolation(format!(
                "beam coordinates must have {PHASE_SPACE_DIM} columns, got {}",
                coords.ncols()
            )));
        }
        Ok(Beam {
            species,
            kinetic_energy_ev,
            coords,
            s_m: 0.0,
            history: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    /// One phase-space column, e.g. `beam.column(column::X)`.
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.coords.column(index)
    }

    /// Total energy E = T + mc² [eV].
    pub fn total_energy_ev(&self) -> f64 {
        self.kinetic_energy_ev + self.species.rest_energy_ev
    }

    /// Lorentz factor.
    pub fn gamma(&self) -> f64 {
        self.total_energy_ev() / self.species.rest_energy_ev
    }

    /// Relativistic velocity factor v/c.
    pub fn beta(&self) -> f64 {
        let g = self.gamma();
        (1.0 - 1.0 / (g * g)).max(0.0).sqrt()
    }

    /// Reference momentum times c [eV].
    pub fn momentum_ev(&self) -> f64 {
        let t = self.kinetic_energy_ev;
        (t * t + 2.0 * t * self.species.rest_energy_ev).sqrt()
    }

    /// Magnetic rigidity Bρ = p/q [T·m].
    pub fn rigidity_t_m(&self) -> f64 {
        self.momentum_ev() / (C_LIGHT * f64::from(self.species.charge_number.abs()))
    }
}
