//! Named, ordered sequence of beamline elements.

use crate::elements::{BeamlineElement, Element};
use beam_types::config::BeamlineConfig;
use beam_types::error::{BeamError, BeamResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Beamline {
    name: String,
    elements: Vec<Element>,
}

impl Beamline {
    pub fn new(name: &str, elements: Vec<Element>) -> Self {
        Beamline {
            name: name.to_string(),
            elements,
        }
    }

    pub fn from_config(config: &BeamlineConfig) -> BeamResult<Self> {
        let elements = config
            .elements
            .iter()
            .map(Element::from_config)
            .collect::<BeamResult<Vec<_>>>()?;
        Ok(Self::new(&config.name, elements))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Elements in beam order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn total_length_m(&self) -> f64 {
        self.elements.iter().map(|e| e.length_m()).sum()
    }

    /// `(start_s, end_s)` of every element, measured from the line entry.
    pub fn element_spans(&self) -> Vec<(f64, f64)> {
        element_spans(&self.elements)
    }

    /// First element called `name`.
    pub fn find(&self, name: &str) -> BeamResult<&Element> {
        self.elements
            .iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| BeamError::ElementNotFound(name.to_string()))
    }
}

/// `(start_s, end_s)` of each element when laid end to end from s = 0.
pub fn element_spans<E: BeamlineElement>(elements: &[E]) -> Vec<(f64, f64)> {
    let mut s = 0.0;
    elements
        .iter()
        .map(|e| {
            let start = s;
            s += e.length_m();
            (start, s)
        })
        .collect()
}
