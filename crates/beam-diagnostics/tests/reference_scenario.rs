// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Reference Scenario Integration Test
// © 1998–2026 Miroslav Šotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use beam_diagnostics::run_scenario;
use beam_types::config::SimulationConfig;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("scpn_beamline_{label}_{nanos}"))
}

#[test]
fn reference_scenario_writes_all_artifacts() {
    let dir = unique_dir("reference");
    let mut config = SimulationConfig::reference();
    config.beam.seed = Some(2026);
    config.output.path = dir.display().to_string();

    let report = run_scenario(&config).unwrap();
    assert_eq!(report.particle_count, 10_000);
    assert!((report.final_s_m - 0.9).abs() < 1e-12);
    assert_eq!(report.snapshots, 10);

    for name in [
        "Initial_beam.npz",
        "Initial_beam_summary.json",
        "Initial_phase_space.svg",
        "Final_beam.npz",
        "Final_beam_summary.json",
        "Final_phase_space.svg",
        "Final_positions.csv",
        "Final_element_positions.json",
        "Final_envelope.svg",
    ] {
        assert!(dir.join(name).is_file(), "missing {name}");
    }
    assert_eq!(report.positions.csv, dir.join("Final_positions.csv"));

    let initial: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("Initial_beam_summary.json")).unwrap())
            .unwrap();
    let fin: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("Final_beam_summary.json")).unwrap())
            .unwrap();
    assert_eq!(initial["s_m"].as_f64().unwrap(), 0.0);
    assert!((fin["s_m"].as_f64().unwrap() - 0.9).abs() < 1e-12);

    let e0 = initial["horizontal"]["rms_emittance"].as_f64().unwrap();
    let e1 = fin["horizontal"]["rms_emittance"].as_f64().unwrap();
    assert!((e1 - e0).abs() / e0 < 1e-6);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn custom_tags_are_used_for_file_names() {
    let dir = unique_dir("tags");
    let mut config = SimulationConfig::reference();
    config.beam.count = 500;
    config.beam.seed = Some(1);
    config.output.path = dir.display().to_string();
    config.output.initial_tag = "start".to_string();
    config.output.final_tag = "end".to_string();

    run_scenario(&config).unwrap();
    assert!(dir.join("start_beam.npz").is_file());
    assert!(dir.join("end_positions.csv").is_file());
    assert!(!dir.join("Initial_beam.npz").exists());

    let _ = fs::remove_dir_all(&dir);
}
