//! Python bindings for the spectral analyzer

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::spectrum::{AnalyzerConfig, BandFilter, FilterKind, SpectralAnalyzer, WindowType};

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone, Copy)]
pub enum PyWindowType {
    HalfSine,
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::HalfSine => WindowType::HalfSine,
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

/// Filter preset enum exposed to Python
///
/// `AllPass` maps to `FilterKind::None` (`None` is reserved in Python).
#[pyclass(name = "FilterKind")]
#[derive(Clone, Copy)]
pub enum PyFilterKind {
    AllPass,
    LowPass,
    HighPass,
    Notch,
}

impl From<PyFilterKind> for FilterKind {
    fn from(py_kind: PyFilterKind) -> Self {
        match py_kind {
            PyFilterKind::AllPass => FilterKind::None,
            PyFilterKind::LowPass => FilterKind::LowPass,
            PyFilterKind::HighPass => FilterKind::HighPass,
            PyFilterKind::Notch => FilterKind::Notch,
        }
    }
}

/// Spectral analyzer exposed to Python
#[pyclass(name = "SpectralAnalyzer")]
pub struct PySpectralAnalyzer {
    analyzer: SpectralAnalyzer,
}

#[pymethods]
impl PySpectralAnalyzer {
    /// Create a new spectral analyzer
    ///
    /// Args:
    ///     data_size: Block length in samples (at least 2)
    ///     window_type: Window applied before the forward FFT
    #[new]
    #[pyo3(signature = (data_size=512, window_type=PyWindowType::HalfSine))]
    fn new(data_size: usize, window_type: PyWindowType) -> PyResult<Self> {
        let config = AnalyzerConfig {
            data_size,
            window: window_type.into(),
            filter: BandFilter::pass_all(),
        };

        Ok(Self {
            analyzer: SpectralAnalyzer::with_config(config)?,
        })
    }

    /// Load a new block of samples
    ///
    /// Args:
    ///     samples: float32 numpy array with at least data_size values
    fn set_data(&mut self, samples: PyReadonlyArray1<f32>) -> PyResult<()> {
        let samples = samples.as_slice()?;
        self.analyzer.try_set_data(samples)?;
        Ok(())
    }

    /// Filtered, normalized real parts
    fn real<'py>(&mut self, py: Python<'py>) -> &'py PyArray1<f32> {
        PyArray1::from_slice(py, self.analyzer.real())
    }

    /// Filtered, normalized imaginary parts
    fn imaginary<'py>(&mut self, py: Python<'py>) -> &'py PyArray1<f32> {
        PyArray1::from_slice(py, self.analyzer.imaginary())
    }

    /// Normalized amplitude per bin
    fn amplitude<'py>(&mut self, py: Python<'py>) -> &'py PyArray1<f32> {
        PyArray1::from_slice(py, self.analyzer.amplitude())
    }

    /// Phase per bin in radians
    fn phase<'py>(&mut self, py: Python<'py>) -> &'py PyArray1<f32> {
        PyArray1::from_slice(py, self.analyzer.phase())
    }

    /// Filtered block reconstructed in the time domain
    fn data<'py>(&mut self, py: Python<'py>) -> &'py PyArray1<f32> {
        PyArray1::from_slice(py, self.analyzer.data())
    }

    /// Set the pass-band as fractions of the bin count
    fn set_filter(&mut self, low: f32, high: f32) {
        self.analyzer.set_filter(low, high);
    }

    /// Set a preset pass-band
    ///
    /// Args:
    ///     frequency: Cutoff as a fraction of the bin count
    ///     kind: Filter preset (default: LowPass)
    #[pyo3(signature = (frequency, kind=PyFilterKind::LowPass))]
    fn set_filter_kind(&mut self, frequency: f32, kind: PyFilterKind) {
        self.analyzer.set_filter_kind(frequency, kind.into());
    }

    fn remove_filter(&mut self) {
        self.analyzer.remove_filter();
    }

    /// Re-derive everything from the current block (e.g. after a filter change)
    fn invalidate(&mut self) {
        self.analyzer.invalidate();
    }

    fn set_data_size(&mut self, data_size: usize) -> PyResult<()> {
        self.analyzer.set_data_size(data_size)?;
        Ok(())
    }

    fn set_window(&mut self, window_type: PyWindowType) {
        self.analyzer.set_window(window_type.into());
    }

    /// Stop the analyzer for good
    fn stop(&mut self) {
        self.analyzer.stop();
    }

    fn is_running(&self) -> bool {
        self.analyzer.is_running()
    }

    fn bin_size(&self) -> usize {
        self.analyzer.bin_size()
    }

    fn data_size(&self) -> usize {
        self.analyzer.data_size()
    }

    /// Current pass-band as (low, high)
    fn filter(&self) -> (f32, f32) {
        let filter = self.analyzer.filter();
        (filter.low, filter.high)
    }

    /// Bin frequencies in Hz
    fn frequency_bins_hz<'py>(&self, py: Python<'py>, sample_rate: f32) -> &'py PyArray1<f32> {
        let freqs: Vec<f32> = (0..self.analyzer.bin_size())
            .map(|bin| self.analyzer.bin_to_hz(bin, sample_rate))
            .collect();
        PyArray1::from_vec(py, freqs)
    }
}
