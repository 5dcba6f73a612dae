// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Diagnostics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Beam output artifacts and the scenario driver.
//!
//! Stage 3: beam snapshots (`.npz`, JSON summary, phase-space SVG).
//! Stage 4: position traces along the line (CSV, element JSON, envelope SVG).

pub mod outputs;
pub mod plot;
pub mod scenario;

pub use outputs::{write_beam, write_beam_positions, BeamArtifacts, PositionArtifacts};
pub use scenario::{run_scenario, ScenarioReport};
