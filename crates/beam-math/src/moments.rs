//! Second-order phase-space moments and Twiss parameter extraction.

use crate::transfer::Transfer2;
use beam_types::error::{BeamError, BeamResult};
use ndarray::{Array2, ArrayView1};
use serde::Serialize;

const MIN_EMITTANCE: f64 = 1e-30;
/// Emittance relative to sigma_q * sigma_p below which the plane is degenerate.
const MIN_RELATIVE_EMITTANCE: f64 = 1e-6;

/// First and second moments of one `(q, p)` plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaneMoments {
    pub mean_q: f64,
    pub mean_p: f64,
    pub var_q: f64,
    pub var_p: f64,
    pub cov_qp: f64,
}

impl PlaneMoments {
    /// Central moments of columns `q_col` and `p_col` of an `(n, k)` array.
    pub fn from_columns(coords: &Array2<f64>, q_col: usize, p_col: usize) -> BeamResult<Self> {
        if coords.nrows() == 0 {
            return Err(BeamError::EmptyBeam);
        }
        if q_col >= coords.ncols() || p_col >= coords.ncols() {
            return Err(BeamError::PhysicsViolation(format!(
                "moment columns ({q_col}, {p_col}) out of range for {} columns",
                coords.ncols()
            )));
        }
        Ok(Self::from_views(coords.column(q_col), coords.column(p_col)))
    }

    fn from_views(q: ArrayView1<f64>, p: ArrayView1<f64>) -> Self {
        let n = q.len() as f64;
        let mean_q = q.sum() / n;
        let mean_p = p.sum() / n;
        let mut var_q = 0.0;
        let mut var_p = 0.0;
        let mut cov_qp = 0.0;
        for (&qi, &pi) in q.iter().zip(p.iter()) {
            let dq = qi - mean_q;
            let dp = pi - mean_p;
            var_q += dq * dq;
            var_p += dp * dp;
            cov_qp += dq * dp;
        }
        PlaneMoments {
            mean_q,
            mean_p,
            var_q: var_q / n,
            var_p: var_p / n,
            cov_qp: cov_qp / n,
        }
    }

    pub fn rms_q(&self) -> f64 {
        self.var_q.max(0.0).sqrt()
    }

    pub fn rms_p(&self) -> f64 {
        self.var_p.max(0.0).sqrt()
    }

    /// Geometric rms emittance: sqrt(<q^2><p^2> - <qp>^2).
    pub fn rms_emittance(&self) -> f64 {
        (self.var_q * self.var_p - self.cov_qp * self.cov_qp)
            .max(0.0)
            .sqrt()
    }
}

/// Courant-Snyder parameters of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwissParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub emittance: f64,
}

impl TwissParams {
    /// Twiss parameters of the given rms size, emittance and alpha.
    pub fn from_size(sigma: f64, emittance: f64, alpha: f64) -> BeamResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(BeamError::PhysicsViolation(format!(
                "rms size must be finite and > 0, got {sigma}"
            )));
        }
        if !emittance.is_finite() || emittance <= 0.0 {
            return Err(BeamError::PhysicsViolation(format!(
                "emittance must be finite and > 0, got {emittance}"
            )));
        }
        if !alpha.is_finite() {
            return Err(BeamError::PhysicsViolation(
                "alpha must be finite".to_string(),
            ));
        }
        let beta = sigma * sigma / emittance;
        Ok(TwissParams {
            alpha,
            beta,
            gamma: (1.0 + alpha * alpha) / beta,
            emittance,
        })
    }

    /// Statistical Twiss parameters of a measured distribution.
    pub fn from_moments(m: &PlaneMoments) -> BeamResult<Self> {
        let emittance = m.rms_emittance();
        if emittance < MIN_EMITTANCE || emittance < MIN_RELATIVE_EMITTANCE * m.rms_q() * m.rms_p() {
            return Err(BeamError::PhysicsViolation(format!(
                "rms emittance {emittance:e} too small to define Twiss parameters"
            )));
        }
        Ok(TwissParams {
            alpha: -m.cov_qp / emittance,
            beta: m.var_q / emittance,
            gamma: m.var_p / emittance,
            emittance,
        })
    }

    /// Rms size sqrt(beta * emittance).
    pub fn sigma(&self) -> f64 {
        (self.beta * self.emittance).max(0.0).sqrt()
    }

    /// Transport through a 2x2 map: sigma' = M sigma M^T.
    pub fn propagate(&self, m: &Transfer2) -> Self {
        let [[c, s], [cp, sp]] = m.0;
        let beta = c * c * self.beta - 2.0 * c * s * self.alpha + s * s * self.gamma;
        let alpha = -c * cp * self.beta + (c * sp + s * cp) * self.alpha - s * sp * self.gamma;
        let gamma = cp * cp * self.beta - 2.0 * cp * sp * self.alpha + sp * sp * self.gamma;
        TwissParams {
            alpha,
            beta,
            gamma,
            emittance: self.emittance,
        }
    }
}
