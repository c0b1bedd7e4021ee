//! Python bindings for the signal helpers

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::audio::{SineOscillator, TempoDetector};

/// Tempo detector exposed to Python
#[pyclass(name = "TempoDetector")]
pub struct PyTempoDetector {
    detector: TempoDetector,
}

#[pymethods]
impl PyTempoDetector {
    /// Args:
    ///     sample_rate: Sample rate in Hz
    ///     threshold: Minimum level for a peak
    ///     neighbors: Samples on each side a peak must exceed
    #[new]
    #[pyo3(signature = (sample_rate, threshold=0.1, neighbors=2))]
    fn new(sample_rate: f32, threshold: f32, neighbors: usize) -> Self {
        Self {
            detector: TempoDetector::with_params(sample_rate, threshold, neighbors),
        }
    }

    /// Scan a block; returns the tempo in BPM or None
    fn process(&mut self, block: PyReadonlyArray1<f32>) -> PyResult<Option<f32>> {
        Ok(self.detector.process(block.as_slice()?))
    }

    fn tempo_bpm(&self) -> Option<f32> {
        self.detector.tempo_bpm()
    }

    fn reset(&mut self) {
        self.detector.reset();
    }

    /// Limit how many recent peak distances are averaged
    fn set_history(&mut self, history: usize) {
        self.detector.set_history(history);
    }
}

/// Sine oscillator exposed to Python
#[pyclass(name = "SineOscillator")]
pub struct PySineOscillator {
    oscillator: SineOscillator,
}

#[pymethods]
impl PySineOscillator {
    #[new]
    #[pyo3(signature = (sample_rate, frequency, amplitude=0.5))]
    fn new(sample_rate: f32, frequency: f32, amplitude: f32) -> Self {
        Self {
            oscillator: SineOscillator::new(sample_rate, frequency, amplitude),
        }
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.oscillator.set_frequency(frequency);
    }

    fn set_amplitude(&mut self, amplitude: f32) {
        self.oscillator.set_amplitude(amplitude);
    }

    /// Render `length` mono samples
    fn render<'py>(&mut self, py: Python<'py>, length: usize) -> &'py PyArray1<f32> {
        let mut block = vec![0.0; length];
        self.oscillator.fill(&mut block);
        PyArray1::from_vec(py, block)
    }
}
