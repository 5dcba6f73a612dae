// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Speed of light in vacuum (m/s).
pub const C_LIGHT: f64 = 299_792_458.0;

/// Elementary charge (C)
pub const Q_ELEMENTARY: f64 = 1.602176634e-19;

/// Electron rest energy (eV)
pub const ELECTRON_REST_ENERGY_EV: f64 = 510_998.950_00;

/// Proton rest energy (eV)
pub const PROTON_REST_ENERGY_EV: f64 = 938_272_088.16;

/// Alpha particle (He-4 nucleus) rest energy (eV)
pub const ALPHA_REST_ENERGY_EV: f64 = 3_727_379_405.8;

/// eV per keV
pub const EV_PER_KEV: f64 = 1.0e3;

/// eV per MeV
pub const EV_PER_MEV: f64 = 1.0e6;
