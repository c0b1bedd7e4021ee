//! PyO3 bindings for Python integration

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::SpectrumError;

mod audio_bindings;
mod processor_bindings;
mod spectrum_bindings;

impl From<SpectrumError> for PyErr {
    fn from(err: SpectrumError) -> PyErr {
        match err {
            SpectrumError::Fft(_) | SpectrumError::ProcessorRunning => {
                PyRuntimeError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn spectral_lens(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<spectrum_bindings::PySpectralAnalyzer>()?;
    m.add_class::<processor_bindings::PySpectralProcessor>()?;
    m.add_class::<audio_bindings::PyTempoDetector>()?;
    m.add_class::<audio_bindings::PySineOscillator>()?;

    // Enums
    m.add_class::<spectrum_bindings::PyWindowType>()?;
    m.add_class::<spectrum_bindings::PyFilterKind>()?;

    Ok(())
}
