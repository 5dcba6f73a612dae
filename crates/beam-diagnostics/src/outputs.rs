// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Beam Outputs
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Output artifacts for a beam: `.npz` phase-space snapshot, JSON summary,
//! phase-space plots, and the position trace recorded during transport.

use crate::plot::{render_line_chart, render_scatter_panels, Band, ScatterPanel, Series};
use beam_core::beamline::element_spans;
use beam_core::elements::{BeamlineElement, ElementKind};
use beam_math::moments::{PlaneMoments, TwissParams};
use beam_types::error::{BeamError, BeamResult};
use beam_types::state::{column, Beam, BeamSnapshot, Species};
use ndarray::Array1;
use ndarray_npy::NpzWriter;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const M_TO_MM: f64 = 1.0e3;
const RAD_TO_MRAD: f64 = 1.0e3;

/// Files written by [`write_beam`].
#[derive(Debug, Clone, PartialEq)]
pub struct BeamArtifacts {
    pub npz: PathBuf,
    pub summary: PathBuf,
    pub phase_space_plot: PathBuf,
}

/// Files written by [`write_beam_positions`].
#[derive(Debug, Clone, PartialEq)]
pub struct PositionArtifacts {
    pub csv: PathBuf,
    pub elements: PathBuf,
    pub envelope_plot: PathBuf,
}

/// Moments and, when defined, Twiss parameters of one plane.
#[derive(Debug, Clone, Serialize)]
pub struct PlaneSummary {
    pub moments: PlaneMoments,
    pub rms_emittance: f64,
    pub twiss: Option<TwissParams>,
}

impl PlaneSummary {
    fn of(beam: &Beam, q: usize, p: usize) -> BeamResult<Self> {
        let moments = PlaneMoments::from_columns(&beam.coords, q, p)?;
        Ok(PlaneSummary {
            moments,
            rms_emittance: moments.rms_emittance(),
            twiss: TwissParams::from_moments(&moments).ok(),
        })
    }
}

/// Contents of `{tag}_beam_summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct BeamSummary {
    pub tag: String,
    pub species: Species,
    pub particle_count: usize,
    pub kinetic_energy_ev: f64,
    pub gamma: f64,
    pub beta: f64,
    pub rigidity_t_m: f64,
    pub s_m: f64,
    pub horizontal: PlaneSummary,
    pub vertical: PlaneSummary,
    pub longitudinal: PlaneSummary,
}

impl BeamSummary {
    pub fn of(beam: &Beam, tag: &str) -> BeamResult<Self> {
        Ok(BeamSummary {
            tag: tag.to_string(),
            species: beam.species.clone(),
            particle_count: beam.len(),
            kinetic_energy_ev: beam.kinetic_energy_ev,
            gamma: beam.gamma(),
            beta: beam.beta(),
            rigidity_t_m: beam.rigidity_t_m(),
            s_m: beam.s_m,
            horizontal: PlaneSummary::of(beam, column::X, column::XP)?,
            vertical: PlaneSummary::of(beam, column::Y, column::YP)?,
            longitudinal: PlaneSummary::of(beam, column::Z, column::DELTA)?,
        })
    }
}

/// One entry of `{tag}_element_positions.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementPosition {
    pub index: usize,
    pub name: String,
    pub kind: String,
    pub start_s_m: f64,
    pub end_s_m: f64,
    /// Beam rms sizes at the element exit, if the beam went through it.
    pub exit_x_rms_m: Option<f64>,
    pub exit_y_rms_m: Option<f64>,
}

fn validate_tag(tag: &str) -> BeamResult<()> {
    if tag.is_empty() || tag.contains(['/', '\\']) {
        return Err(BeamError::ConfigError(format!(
            "output tag must be non-empty and free of path separators, got '{tag}'"
        )));
    }
    Ok(())
}

fn prepare_dir(path: &Path) -> BeamResult<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

fn phase_space_panels(beam: &Beam) -> Vec<ScatterPanel> {
    let pairs = |q: usize, p: usize, q_scale: f64, p_scale: f64| -> Vec<(f64, f64)> {
        beam.coords
            .rows()
            .into_iter()
            .map(|row| (row[q] * q_scale, row[p] * p_scale))
            .collect()
    };
    vec![
        ScatterPanel {
            title: "Horizontal phase space".to_string(),
            x_label: "x [mm]".to_string(),
            y_label: "x' [mrad]".to_string(),
            points: pairs(column::X, column::XP, M_TO_MM, RAD_TO_MRAD),
        },
        ScatterPanel {
            title: "Vertical phase space".to_string(),
            x_label: "y [mm]".to_string(),
            y_label: "y' [mrad]".to_string(),
            points: pairs(column::Y, column::YP, M_TO_MM, RAD_TO_MRAD),
        },
        ScatterPanel {
            title: "Transverse profile".to_string(),
            x_label: "x [mm]".to_string(),
            y_label: "y [mm]".to_string(),
            points: pairs(column::X, column::Y, M_TO_MM, M_TO_MM),
        },
    ]
}

/// Write the phase-space snapshot, summary and plots of `beam` under `path`.
pub fn write_beam(beam: &Beam, path: impl AsRef<Path>, tag: &str) -> BeamResult<BeamArtifacts> {
    validate_tag(tag)?;
    if beam.is_empty() {
        return Err(BeamError::EmptyBeam);
    }
    let dir = path.as_ref();
    prepare_dir(dir)?;

    let npz_path = dir.join(format!("{tag}_beam.npz"));
    let mut npz = NpzWriter::new(File::create(&npz_path)?);
    npz.add_array("coordinates", &beam.coords)
        .map_err(|e| BeamError::NpyWrite(format!("{}: {e}", npz_path.display())))?;
    npz.add_array("s_m", &Array1::from_elem(1, beam.s_m))
        .map_err(|e| BeamError::NpyWrite(format!("{}: {e}", npz_path.display())))?;
    npz.add_array(
        "kinetic_energy_ev",
        &Array1::from_elem(1, beam.kinetic_energy_ev),
    )
    .map_err(|e| BeamError::NpyWrite(format!("{}: {e}", npz_path.display())))?;
    npz.finish()
        .map_err(|e| BeamError::NpyWrite(format!("{}: {e}", npz_path.display())))?;

    let summary_path = dir.join(format!("{tag}_beam_summary.json"));
    let summary = BeamSummary::of(beam, tag)?;
    let writer = BufWriter::new(File::create(&summary_path)?);
    serde_json::to_writer_pretty(writer, &summary)?;

    let plot_path = dir.join(format!("{tag}_phase_space.svg"));
    let title = format!(
        "{tag}: {} {} at s = {:.3} m",
        beam.len(),
        beam.species.name,
        beam.s_m
    );
    fs::write(&plot_path, render_scatter_panels(&title, &phase_space_panels(beam)))?;

    info!(
        tag,
        dir = %dir.display(),
        particles = beam.len(),
        "wrote beam snapshot"
    );
    Ok(BeamArtifacts {
        npz: npz_path,
        summary: summary_path,
        phase_space_plot: plot_path,
    })
}

/// Per-element layout with the beam size at each element exit.
///
/// Spans are placed on the same `s` axis as `history`, taking the last pass
/// through `elements` to end at the last recorded snapshot.
pub fn element_positions<E: BeamlineElement>(
    history: &[BeamSnapshot],
    elements: &[E],
) -> Vec<ElementPosition> {
    let spans = element_spans(elements);
    let line_length_m = spans.last().map_or(0.0, |&(_, end)| end);
    let origin_s_m = history
        .last()
        .map_or(0.0, |snap| (snap.s_m - line_length_m).max(0.0));
    spans
        .into_iter()
        .zip(elements.iter())
        .enumerate()
        .map(|(index, ((start_s_m, end_s_m), element))| {
            let exit = history
                .iter()
                .rev()
                .find(|snap| snap.element_index == Some(index));
            ElementPosition {
                index,
                name: element.name().to_string(),
                kind: element.kind().as_str().to_string(),
                start_s_m: origin_s_m + start_s_m,
                end_s_m: origin_s_m + end_s_m,
                exit_x_rms_m: exit.map(|s| s.x_rms_m),
                exit_y_rms_m: exit.map(|s| s.y_rms_m),
            }
        })
        .collect()
}

fn write_positions_csv(history: &[BeamSnapshot], path: &Path) -> BeamResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(
        out,
        "s_m,element_index,element_name,x_mean_m,y_mean_m,x_rms_m,y_rms_m,x_min_m,x_max_m,y_min_m,y_max_m"
    )?;
    for snap in history {
        let index = snap
            .element_index
            .map(|i| i.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{:.9},{},{},{:e},{:e},{:e},{:e},{:e},{:e},{:e},{:e}",
            snap.s_m,
            index,
            snap.element_name.replace(',', ";"),
            snap.x_mean_m,
            snap.y_mean_m,
            snap.x_rms_m,
            snap.y_rms_m,
            snap.x_min_m,
            snap.x_max_m,
            snap.y_min_m,
            snap.y_max_m
        )?;
    }
    out.flush()?;
    Ok(())
}

fn band_color(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Drift => "#bbbbbb",
        ElementKind::Quadrupole => "#ff7f0e",
    }
}

/// Write the transport trace of `beam` through `elements` under `path`.
pub fn write_beam_positions<E: BeamlineElement>(
    beam: &Beam,
    elements: &[E],
    path: impl AsRef<Path>,
    tag: &str,
) -> BeamResult<PositionArtifacts> {
    validate_tag(tag)?;
    if beam.history.is_empty() {
        return Err(BeamError::PhysicsViolation(
            "beam has no recorded positions; transport it first".to_string(),
        ));
    }
    let dir = path.as_ref();
    prepare_dir(dir)?;

    let csv_path = dir.join(format!("{tag}_positions.csv"));
    write_positions_csv(&beam.history, &csv_path)?;

    let elements_path = dir.join(format!("{tag}_element_positions.json"));
    let positions = element_positions(&beam.history, elements);
    let writer = BufWriter::new(File::create(&elements_path)?);
    serde_json::to_writer_pretty(writer, &positions)?;

    let envelope_path = dir.join(format!("{tag}_envelope.svg"));
    let series = vec![
        Series {
            label: "x rms".to_string(),
            color: "#d62728",
            points: beam
                .history
                .iter()
                .map(|s| (s.s_m, s.x_rms_m * M_TO_MM))
                .collect(),
        },
        Series {
            label: "y rms".to_string(),
            color: "#1f77b4",
            points: beam
                .history
                .iter()
                .map(|s| (s.s_m, s.y_rms_m * M_TO_MM))
                .collect(),
        },
    ];
    let bands: Vec<Band> = positions
        .iter()
        .zip(elements.iter())
        .map(|(p, e)| Band {
            label: p.name.clone(),
            start: p.start_s_m,
            end: p.end_s_m,
            color: band_color(e.kind()),
        })
        .collect();
    let svg = render_line_chart(
        &format!("{tag}: beam envelope"),
        "s [m]",
        "rms size [mm]",
        &series,
        &bands,
    );
    fs::write(&envelope_path, svg)?;

    info!(
        tag,
        dir = %dir.display(),
        snapshots = beam.history.len(),
        elements = elements.len(),
        "wrote beam positions"
    );
    Ok(PositionArtifacts {
        csv: csv_path,
        elements: elements_path,
        envelope_plot: envelope_path,
    })
}
