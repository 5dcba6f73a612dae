//! Beam generation, beamline elements and particle transport.
//!
//! Stage 1: random beam generation
//! Stage 2: drift / quadrupole elements, beamline, stepwise transport

pub mod beamline;
pub mod elements;
pub mod particles;
pub mod transport;

pub use beamline::Beamline;
pub use elements::{BeamlineElement, DriftTube, Element, ElementKind, QuadrupoleMagnet};
pub use particles::{random_beam, RandomBeamBuilder};
pub use transport::transport_beam;
