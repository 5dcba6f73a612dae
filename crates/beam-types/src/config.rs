// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{BeamError, BeamResult};
use serde::{Deserialize, Serialize};

/// Top-level transport scenario: beam, line, step and output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    pub beam: BeamConfig,
    pub beamline: BeamlineConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Random beam generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Species name, e.g. "electron" or "proton".
    pub particle: String,
    pub count: usize,
    pub kinetic_energy_ev: f64,
    pub sigma_x_m: f64,
    pub sigma_y_m: f64,
    pub emittance_x_m_rad: f64,
    pub emittance_y_m_rad: f64,
    pub alpha_x: f64,
    pub alpha_y: f64,
    /// Longitudinal rms size (default: 0, mono-bunch)
    #[serde(default)]
    pub sigma_z_m: f64,
    /// Relative rms momentum spread (default: 0)
    #[serde(default)]
    pub energy_spread: f64,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamlineConfig {
    pub name: String,
    pub elements: Vec<ElementConfig>,
}

/// One beamline element, tagged by `"type"` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementConfig {
    Drift {
        name: String,
        length_m: f64,
    },
    Quadrupole {
        name: String,
        length_m: f64,
        /// Normalised focusing strength k1 [m^-2]
        strength: f64,
    },
}

impl ElementConfig {
    pub fn name(&self) -> &str {
        match self {
            ElementConfig::Drift { name, .. } | ElementConfig::Quadrupole { name, .. } => name,
        }
    }

    pub fn length_m(&self) -> f64 {
        match self {
            ElementConfig::Drift { length_m, .. } | ElementConfig::Quadrupole { length_m, .. } => {
                *length_m
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Maximum slice length [m] (default: 0.1)
    #[serde(default = "default_step_m")]
    pub step_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_initial_tag")]
    pub initial_tag: String,
    #[serde(default = "default_final_tag")]
    pub final_tag: String,
}

fn default_step_m() -> f64 {
    0.1
}
fn default_output_path() -> String {
    "outputs".to_string()
}
fn default_initial_tag() -> String {
    "Initial".to_string()
}
fn default_final_tag() -> String {
    "Final".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            step_m: default_step_m(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: default_output_path(),
            initial_tag: default_initial_tag(),
            final_tag: default_final_tag(),
        }
    }
}

fn require_positive(value: f64, label: &str) -> BeamResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BeamError::ConfigError(format!(
            "{label} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

fn require_non_negative(value: f64, label: &str) -> BeamResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(BeamError::ConfigError(format!(
            "{label} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

impl SimulationConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> BeamResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 10k electrons at 250 keV through drift(0.2) -> quad(0.5, 0.4) -> drift(0.2).
    pub fn reference() -> Self {
        let drift = ElementConfig::Drift {
            name: "drift".to_string(),
            length_m: 0.2,
        };
        SimulationConfig {
            name: "beamline-transport-with-step".to_string(),
            beam: BeamConfig {
                particle: "electron".to_string(),
                count: 10_000,
                kinetic_energy_ev: 250.0e3,
                sigma_x_m: 0.003,
                sigma_y_m: 0.003,
                emittance_x_m_rad: 1e-6,
                emittance_y_m_rad: 1e-6,
                alpha_x: -0.5,
                alpha_y: -0.5,
                sigma_z_m: 0.0,
                energy_spread: 0.0,
                seed: None,
            },
            beamline: BeamlineConfig {
                name: "beamline".to_string(),
                elements: vec![
                    drift.clone(),
                    ElementConfig::Quadrupole {
                        name: "quadrupole".to_string(),
                        length_m: 0.5,
                        strength: 0.4,
                    },
                    drift,
                ],
            },
            transport: TransportConfig::default(),
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> BeamResult<()> {
        let beam = &self.beam;
        if beam.count == 0 {
            return Err(BeamError::ConfigError(
                "beam.count must be >= 1".to_string(),
            ));
        }
        require_positive(beam.kinetic_energy_ev, "beam.kinetic_energy_ev")?;
        require_positive(beam.sigma_x_m, "beam.sigma_x_m")?;
        require_positive(beam.sigma_y_m, "beam.sigma_y_m")?;
        require_positive(beam.emittance_x_m_rad, "beam.emittance_x_m_rad")?;
        require_positive(beam.emittance_y_m_rad, "beam.emittance_y_m_rad")?;
        if !beam.alpha_x.is_finite() || !beam.alpha_y.is_finite() {
            return Err(BeamError::ConfigError(
                "beam.alpha_x and beam.alpha_y must be finite".to_string(),
            ));
        }
        require_non_negative(beam.sigma_z_m, "beam.sigma_z_m")?;
        require_non_negative(beam.energy_spread, "beam.energy_spread")?;

        for (idx, element) in self.beamline.elements.iter().enumerate() {
            require_positive(
                element.length_m(),
                &format!("beamline.elements[{idx}].length_m"),
            )?;
            if let ElementConfig::Quadrupole { strength, .. } = element {
                if !strength.is_finite() {
                    return Err(BeamError::ConfigError(format!(
                        "beamline.elements[{idx}].strength must be finite"
                    )));
                }
            }
        }

        require_positive(self.transport.step_m, "transport.step_m")?;
        if self.output.path.trim().is_empty() {
            return Err(BeamError::ConfigError(
                "output.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
