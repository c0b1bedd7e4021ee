//! Python bindings for the background spectral processor

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use super::spectrum_bindings::{PyFilterKind, PyWindowType};
use crate::audio::{ProcessorConfig, SampleProducer, SpectralProcessor};
use crate::spectrum::{AnalyzerConfig, BandFilter};

/// Spectral processor exposed to Python
///
/// Samples pushed from Python are analyzed on a Rust thread; Python only
/// reads the published frames.
#[pyclass(name = "SpectralProcessor", unsendable)]
pub struct PySpectralProcessor {
    processor: SpectralProcessor,
    producer: Option<SampleProducer>,
}

#[pymethods]
impl PySpectralProcessor {
    /// Create new spectral processor
    ///
    /// Args:
    ///     data_size: Block length in samples
    ///     window_type: Analysis window
    ///     ring_capacity: Ring buffer capacity in samples
    #[new]
    #[pyo3(signature = (data_size=512, window_type=PyWindowType::HalfSine, ring_capacity=96000))]
    fn new(data_size: usize, window_type: PyWindowType, ring_capacity: usize) -> Self {
        let config = ProcessorConfig {
            analyzer: AnalyzerConfig {
                data_size,
                window: window_type.into(),
                filter: BandFilter::pass_all(),
            },
            ring_capacity,
            ..ProcessorConfig::default()
        };

        Self {
            processor: SpectralProcessor::new(config),
            producer: None,
        }
    }

    /// Start the processing thread
    fn start(&mut self) -> PyResult<()> {
        self.producer = Some(self.processor.start()?);
        Ok(())
    }

    /// Stop the processing thread
    fn stop(&mut self) {
        self.processor.stop();
        self.producer = None;
    }

    /// Queue samples for analysis
    ///
    /// Returns:
    ///     Number of samples accepted (less than given if the buffer is full)
    fn push(&mut self, samples: PyReadonlyArray1<f32>) -> PyResult<usize> {
        let producer = self
            .producer
            .as_mut()
            .ok_or_else(|| PyRuntimeError::new_err("Processor is not running"))?;
        Ok(producer.write(samples.as_slice()?))
    }

    /// Set the pass-band for subsequent blocks
    fn set_filter(&self, low: f32, high: f32) {
        self.processor.set_filter(low, high);
    }

    /// Set a preset pass-band for subsequent blocks
    #[pyo3(signature = (frequency, kind=PyFilterKind::LowPass))]
    fn set_filter_kind(&self, frequency: f32, kind: PyFilterKind) {
        self.processor.set_filter_kind(frequency, kind.into());
    }

    fn is_running(&self) -> bool {
        self.processor.is_running()
    }

    fn frames_processed(&self) -> u64 {
        self.processor.frames_processed()
    }

    /// Get the latest frame
    ///
    /// Returns:
    ///     Dictionary with keys: 'amplitude', 'phase', 'filtered',
    ///     'frame_index', or None if no new frame
    fn latest_frame(&self, py: Python<'_>) -> Option<PyObject> {
        self.processor.latest_frame().map(|frame| {
            let dict = pyo3::types::PyDict::new(py);

            dict.set_item("amplitude", PyArray1::from_vec(py, frame.amplitude)).ok();
            dict.set_item("phase", PyArray1::from_vec(py, frame.phase)).ok();
            dict.set_item("filtered", PyArray1::from_vec(py, frame.filtered)).ok();
            dict.set_item("frame_index", frame.frame_index).ok();

            dict.into()
        })
    }
}
