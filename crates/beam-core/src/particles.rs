//! Random particle ensembles matched to a Twiss ellipse.
//!
//! Each transverse plane is sampled as a correlated Gaussian:
//! `q = sqrt(eps * beta) * u1`, `p = sqrt(eps / beta) * (-alpha * u1 + u2)`
//! with independent standard normals `u1`, `u2`.

use beam_math::moments::TwissParams;
use beam_types::error::{BeamError, BeamResult};
use beam_types::state::{column, Beam, PHASE_SPACE_DIM};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

pub use beam_types::state::Species;

/// Requested size, emittance and correlation of one transverse plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSpec {
    pub sigma_m: f64,
    pub emittance_m_rad: f64,
    pub alpha: f64,
}

/// Builder for a random Gaussian beam.
#[derive(Debug, Clone)]
pub struct RandomBeamBuilder {
    species: Species,
    count: usize,
    kinetic_energy_ev: f64,
    x: PlaneSpec,
    y: PlaneSpec,
    sigma_z_m: f64,
    energy_spread: f64,
    seed: Option<u64>,
}

impl RandomBeamBuilder {
    pub fn new(species: Species, count: usize, kinetic_energy_ev: f64) -> Self {
        RandomBeamBuilder {
            species,
            count,
            kinetic_energy_ev,
            x: PlaneSpec {
                sigma_m: 1e-3,
                emittance_m_rad: 1e-6,
                alpha: 0.0,
            },
            y: PlaneSpec {
                sigma_m: 1e-3,
                emittance_m_rad: 1e-6,
                alpha: 0.0,
            },
            sigma_z_m: 0.0,
            energy_spread: 0.0,
            seed: None,
        }
    }

    pub fn horizontal(mut self, sigma_m: f64, emittance_m_rad: f64, alpha: f64) -> Self {
        self.x = PlaneSpec {
            sigma_m,
            emittance_m_rad,
            alpha,
        };
        self
    }

    pub fn vertical(mut self, sigma_m: f64, emittance_m_rad: f64, alpha: f64) -> Self {
        self.y = PlaneSpec {
            sigma_m,
            emittance_m_rad,
            alpha,
        };
        self
    }

    /// Longitudinal rms bunch length [m].
    pub fn bunch_length(mut self, sigma_z_m: f64) -> Self {
        self.sigma_z_m = sigma_z_m;
        self
    }

    /// Relative rms momentum spread.
    pub fn energy_spread(mut self, energy_spread: f64) -> Self {
        self.energy_spread = energy_spread;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> BeamResult<(TwissParams, TwissParams)> {
        if self.count == 0 {
            return Err(BeamError::PhysicsViolation(
                "particle count must be >= 1".to_string(),
            ));
        }
        if !self.sigma_z_m.is_finite() || self.sigma_z_m < 0.0 {
            return Err(BeamError::PhysicsViolation(
                "sigma_z_m must be finite and >= 0".to_string(),
            ));
        }
        if !self.energy_spread.is_finite() || self.energy_spread < 0.0 {
            return Err(BeamError::PhysicsViolation(
                "energy_spread must be finite and >= 0".to_string(),
            ));
        }
        let tx = TwissParams::from_size(self.x.sigma_m, self.x.emittance_m_rad, self.x.alpha)?;
        let ty = TwissParams::from_size(self.y.sigma_m, self.y.emittance_m_rad, self.y.alpha)?;
        Ok((tx, ty))
    }

    /// Sample the ensemble. Seeded builders are reproducible.
    pub fn build(&self) -> BeamResult<Beam> {
        let (tx, ty) = self.validate()?;
        let coords = match self.seed {
            Some(seed) => self.sample(&mut StdRng::seed_from_u64(seed), &tx, &ty),
            None => self.sample(&mut rand::thread_rng(), &tx, &ty),
        };
        Beam::new(self.species.clone(), self.kinetic_energy_ev, coords)
    }

    fn sample<R: Rng>(&self, rng: &mut R, tx: &TwissParams, ty: &TwissParams) -> Array2<f64> {
        let mut coords = Array2::zeros((self.count, PHASE_SPACE_DIM));
        for mut row in coords.rows_mut() {
            let (x, xp) = sample_plane(rng, tx);
            let (y, yp) = sample_plane(rng, ty);
            row[column::X] = x;
            row[column::XP] = xp;
            row[column::Y] = y;
            row[column::YP] = yp;
            if self.sigma_z_m > 0.0 {
                row[column::Z] = self.sigma_z_m * rng.sample::<f64, _>(StandardNormal);
            }
            if self.energy_spread > 0.0 {
                row[column::DELTA] = self.energy_spread * rng.sample::<f64, _>(StandardNormal);
            }
        }
        coords
    }
}

fn sample_plane<R: Rng>(rng: &mut R, twiss: &TwissParams) -> (f64, f64) {
    let u1: f64 = rng.sample(StandardNormal);
    let u2: f64 = rng.sample(StandardNormal);
    let q = (twiss.emittance * twiss.beta).sqrt() * u1;
    let p = (twiss.emittance / twiss.beta).sqrt() * (-twiss.alpha * u1 + u2);
    (q, p)
}

/// Generate a Gaussian beam of `particle` matched to the given rms sizes,
/// emittances and Twiss alphas in both transverse planes.
#[allow(clippy::too_many_arguments)]
pub fn random_beam(
    particle: &str,
    count: usize,
    kinetic_energy_ev: f64,
    sigma_x_m: f64,
    sigma_y_m: f64,
    emittance_x_m_rad: f64,
    emittance_y_m_rad: f64,
    alpha_x: f64,
    alpha_y: f64,
) -> BeamResult<Beam> {
    let species = Species::from_name(particle)?;
    RandomBeamBuilder::new(species, count, kinetic_energy_ev)
        .horizontal(sigma_x_m, emittance_x_m_rad, alpha_x)
        .vertical(sigma_y_m, emittance_y_m_rad, alpha_y)
        .build()
}
