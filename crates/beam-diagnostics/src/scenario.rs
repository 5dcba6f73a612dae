// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Scenario Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Generate → snapshot → transport → snapshot, driven by a [`SimulationConfig`].

use crate::outputs::{write_beam, write_beam_positions, BeamArtifacts, PositionArtifacts};
use beam_core::{transport_beam, Beamline, RandomBeamBuilder};
use beam_types::config::SimulationConfig;
use beam_types::error::BeamResult;
use beam_types::state::{Beam, Species};
use std::path::PathBuf;
use tracing::info;

/// Paths and headline numbers of a finished run.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub output_dir: PathBuf,
    pub initial: BeamArtifacts,
    pub final_beam: BeamArtifacts,
    pub positions: PositionArtifacts,
    pub particle_count: usize,
    pub final_s_m: f64,
    pub snapshots: usize,
}

/// Build the initial beam described by `config.beam`.
pub fn generate_beam(config: &SimulationConfig) -> BeamResult<Beam> {
    let bc = &config.beam;
    let species = Species::from_name(&bc.particle)?;
    let mut builder = RandomBeamBuilder::new(species, bc.count, bc.kinetic_energy_ev)
        .horizontal(bc.sigma_x_m, bc.emittance_x_m_rad, bc.alpha_x)
        .vertical(bc.sigma_y_m, bc.emittance_y_m_rad, bc.alpha_y)
        .bunch_length(bc.sigma_z_m)
        .energy_spread(bc.energy_spread);
    if let Some(seed) = bc.seed {
        builder = builder.seed(seed);
    }
    builder.build()
}

/// Run the full pipeline and write all artifacts under `config.output.path`.
pub fn run_scenario(config: &SimulationConfig) -> BeamResult<ScenarioReport> {
    config.validate()?;
    let output_dir = PathBuf::from(&config.output.path);
    info!(scenario = %config.name, output = %output_dir.display(), "starting scenario");

    let mut beam = generate_beam(config)?;
    info!(
        particle = %beam.species.name,
        count = beam.len(),
        kinetic_energy_ev = beam.kinetic_energy_ev,
        "generated beam"
    );
    let initial = write_beam(&beam, &output_dir, &config.output.initial_tag)?;

    let beamline = Beamline::from_config(&config.beamline)?;
    info!(
        beamline = beamline.name(),
        elements = beamline.elements().len(),
        length_m = beamline.total_length_m(),
        "built beamline"
    );
    transport_beam(&mut beam, beamline.elements(), config.transport.step_m)?;

    let final_beam = write_beam(&beam, &output_dir, &config.output.final_tag)?;
    let positions = write_beam_positions(
        &beam,
        beamline.elements(),
        &output_dir,
        &config.output.final_tag,
    )?;

    Ok(ScenarioReport {
        name: config.name.clone(),
        output_dir,
        initial,
        final_beam,
        positions,
        particle_count: beam.len(),
        final_s_m: beam.s_m,
        snapshots: beam.history.len(),
    })
}
