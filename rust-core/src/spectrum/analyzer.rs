//! Stateful spectral analyzer
//!
//! Takes a block of time-domain samples and lazily derives the filtered
//! spectrum (real/imaginary and amplitude/phase) and the reconstructed
//! time-domain block. Every getter only recomputes what is stale, in
//! dependency order, and returns a view into the analyzer's own buffers.

use super::fft::{bin_to_normalized, normalized_to_hz, FftBackend, RealFftEngine};
use super::filter::{BandFilter, FilterKind};
use super::freshness::{resolve, CacheState, Freshness, Request, Step};
use super::windowing::{AnalysisWindow, WindowType};
use crate::error::SpectrumError;
use num_complex::Complex32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default block length
pub const DEFAULT_DATA_SIZE: usize = 512;

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalyzerConfig {
    /// Block length in samples (at least 2)
    pub data_size: usize,

    /// Window applied before the forward transform
    pub window: WindowType,

    /// Initial pass-band
    pub filter: BandFilter,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            data_size: DEFAULT_DATA_SIZE,
            window: WindowType::HalfSine,
            filter: BandFilter::pass_all(),
        }
    }
}

/// Cloneable handle that stops an analyzer, possibly from another thread
///
/// Stopping is terminal. A forward transform that is running when the
/// handle fires bails out before the next bin.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// All per-size buffers, rebuilt together on resize
struct Buffers {
    input: Vec<f32>,
    windowed: Vec<f32>,
    spectrum: Vec<Complex32>,
    real: Vec<f32>,
    imag: Vec<f32>,
    amplitude: Vec<f32>,
    phase: Vec<f32>,
    reconstructed: Vec<f32>,
}

impl Buffers {
    fn new(data_size: usize, bin_size: usize) -> Self {
        Self {
            input: vec![0.0; data_size],
            windowed: vec![0.0; data_size],
            spectrum: vec![Complex32::new(0.0, 0.0); bin_size],
            real: vec![0.0; bin_size],
            imag: vec![0.0; bin_size],
            amplitude: vec![0.0; bin_size],
            phase: vec![0.0; bin_size],
            reconstructed: vec![0.0; data_size],
        }
    }

    fn clear(&mut self) {
        self.input.fill(0.0);
        self.windowed.fill(0.0);
        self.spectrum.fill(Complex32::new(0.0, 0.0));
        self.real.fill(0.0);
        self.imag.fill(0.0);
        self.amplitude.fill(0.0);
        self.phase.fill(0.0);
        self.reconstructed.fill(0.0);
    }
}

/// Spectral analyzer with lazy, cache-coherent recomputation
///
/// Not internally synchronized: one thread at a time. Use
/// [`StopHandle`] to cancel from elsewhere.
pub struct SpectralAnalyzer<B: FftBackend = RealFftEngine> {
    data_size: usize,
    bin_size: usize,
    window: AnalysisWindow,
    backend: B,
    buffers: Buffers,
    filter: BandFilter,
    cache: CacheState,
    lifecycle: StopHandle,
}

impl SpectralAnalyzer<RealFftEngine> {
    /// Create an analyzer for blocks of `data_size` samples (half-sine window)
    pub fn new(data_size: usize) -> Result<Self, SpectrumError> {
        Self::with_config(AnalyzerConfig {
            data_size,
            ..AnalyzerConfig::default()
        })
    }

    /// Create an analyzer from a full configuration
    pub fn with_config(config: AnalyzerConfig) -> Result<Self, SpectrumError> {
        validate_data_size(config.data_size)?;
        let backend = RealFftEngine::new(config.data_size);
        Ok(Self::build(config, backend))
    }
}

impl Default for SpectralAnalyzer<RealFftEngine> {
    fn default() -> Self {
        let config = AnalyzerConfig::default();
        let backend = RealFftEngine::new(config.data_size);
        Self::build(config, backend)
    }
}

impl<B: FftBackend> SpectralAnalyzer<B> {
    /// Create an analyzer over a caller-supplied FFT engine
    ///
    /// The engine is re-planned for `config.data_size` if needed.
    pub fn with_backend(config: AnalyzerConfig, mut backend: B) -> Result<Self, SpectrumError> {
        validate_data_size(config.data_size)?;
        backend.resize(config.data_size);
        Ok(Self::build(config, backend))
    }

    fn build(config: AnalyzerConfig, backend: B) -> Self {
        let data_size = config.data_size;
        let bin_size = data_size / 2 + 1;

        Self {
            data_size,
            bin_size,
            window: AnalysisWindow::new(config.window, data_size),
            backend,
            buffers: Buffers::new(data_size, bin_size),
            filter: config.filter,
            cache: CacheState::SETTLED,
            lifecycle: StopHandle::new(),
        }
    }

    /// Reset the analyzer for blocks of `data_size` samples
    ///
    /// Resets the filter to pass-all and leaves every buffer (input
    /// included) zeroed and marked fresh. A new size rebuilds the window and
    /// re-plans the FFT; the current size reuses both along with the buffers.
    pub fn set_data_size(&mut self, data_size: usize) -> Result<(), SpectrumError> {
        validate_data_size(data_size)?;

        if !self.is_running() {
            return Ok(());
        }

        if data_size == self.data_size {
            self.buffers.clear();
        } else {
            let bin_size = data_size / 2 + 1;
            let buffers = Buffers::new(data_size, bin_size);
            let window = AnalysisWindow::new(self.window.window_type(), data_size);
            self.backend.resize(data_size);

            self.buffers = buffers;
            self.window = window;
            self.data_size = data_size;
            self.bin_size = bin_size;
            log::debug!("Analyzer resized to {} samples ({} bins)", data_size, bin_size);
        }

        self.filter = BandFilter::pass_all();
        self.cache = CacheState::SETTLED;
        Ok(())
    }

    /// Switch the window function
    ///
    /// Keeps the current input block and marks every derived buffer stale.
    pub fn set_window(&mut self, window_type: WindowType) {
        if !self.is_running() || window_type == self.window.window_type() {
            return;
        }

        self.window = AnalysisWindow::new(window_type, self.data_size);
        self.cache = CacheState::STALE;
        log::debug!("Analyzer window set to {:?}", window_type);
    }

    /// Copy a new input block, invalidating everything derived from the last one
    ///
    /// `samples` must hold at least `data_size` values. Extra values are
    /// ignored. A short buffer is a caller bug: debug builds panic, release
    /// builds zero-fill the missing tail.
    pub fn set_data(&mut self, samples: &[f32]) {
        if !self.is_running() {
            return;
        }

        debug_assert!(
            samples.len() >= self.data_size,
            "set_data needs {} samples, got {}",
            self.data_size,
            samples.len()
        );

        let n = samples.len().min(self.data_size);
        self.buffers.input[..n].copy_from_slice(&samples[..n]);
        if n < self.data_size {
            self.buffers.input[n..].fill(0.0);
            log::warn!(
                "Short sample block: expected {} samples, got {}",
                self.data_size,
                n
            );
        }

        self.cache = CacheState::STALE;
    }

    /// Checked variant of [`set_data`](Self::set_data)
    pub fn try_set_data(&mut self, samples: &[f32]) -> Result<(), SpectrumError> {
        if samples.len() < self.data_size {
            return Err(SpectrumError::ShortBuffer {
                expected: self.data_size,
                actual: samples.len(),
            });
        }

        self.set_data(samples);
        Ok(())
    }

    /// Mark every derived buffer stale, keeping the current input
    ///
    /// Needed to apply a filter change to a block that was already
    /// transformed.
    pub fn invalidate(&mut self) {
        if self.is_running() {
            self.cache = CacheState::STALE;
        }
    }

    /// Filtered, normalized real parts (`bin_size` values)
    pub fn real(&mut self) -> &[f32] {
        self.fulfil(Request::Cartesian);
        &self.buffers.real
    }

    /// Filtered, normalized imaginary parts (`bin_size` values)
    pub fn imaginary(&mut self) -> &[f32] {
        self.fulfil(Request::Cartesian);
        &self.buffers.imag
    }

    /// Normalized magnitude per bin (`bin_size` values)
    pub fn amplitude(&mut self) -> &[f32] {
        self.fulfil(Request::Polar);
        &self.buffers.amplitude
    }

    /// Phase per bin in radians (`bin_size` values)
    pub fn phase(&mut self) -> &[f32] {
        self.fulfil(Request::Polar);
        &self.buffers.phase
    }

    /// Filtered block reconstructed in the time domain (`data_size` values)
    ///
    /// Samples where the window is zero (both ends of the half-sine window)
    /// are divided by zero or by a value close to it and are not usable.
    pub fn data(&mut self) -> &[f32] {
        self.fulfil(Request::TimeDomain);
        &self.buffers.reconstructed
    }

    /// Edit amplitude and phase in place
    ///
    /// The polar buffers are brought up to date first. After `edit` runs,
    /// real/imaginary and the reconstructed block are rebuilt from the
    /// edited polar values on their next request.
    pub fn modify_polar<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut [f32], &mut [f32]),
    {
        self.fulfil(Request::Polar);
        if !self.is_running() || !self.cache.polar.is_fresh() {
            return;
        }

        edit(&mut self.buffers.amplitude, &mut self.buffers.phase);
        self.cache.cartesian = Freshness::Stale;
        self.cache.time_domain = Freshness::Stale;
    }

    /// Set the retained band directly as fractions of the bin count
    ///
    /// Takes effect on the next forward transform, not on cached values.
    pub fn set_filter(&mut self, low: f32, high: f32) {
        self.filter = BandFilter::new(low, high);
    }

    /// Set the retained band from a preset
    pub fn set_filter_kind(&mut self, frequency: f32, kind: FilterKind) {
        self.filter = BandFilter::from_kind(frequency, kind);
    }

    /// Pass every bin again
    pub fn remove_filter(&mut self) {
        self.set_filter_kind(0.0, FilterKind::None);
    }

    /// Stop the analyzer for good
    ///
    /// Getters keep returning whatever is cached; no transform runs again.
    pub fn stop(&mut self) {
        if self.is_running() {
            log::info!("Spectral analyzer stopped");
        }
        self.lifecycle.stop();
    }

    /// Handle that can stop this analyzer from another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.lifecycle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Raw input block as last passed to `set_data`
    pub fn input(&self) -> &[f32] {
        &self.buffers.input
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    pub fn filter(&self) -> BandFilter {
        self.filter
    }

    pub fn window(&self) -> &AnalysisWindow {
        &self.window
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache
    }

    /// Bin frequencies in normalized units (0 to 1, where 1 = Nyquist)
    pub fn frequency_axis(&self) -> Vec<f32> {
        (0..self.bin_size)
            .map(|bin| bin_to_normalized(bin, self.data_size))
            .collect()
    }

    /// Center frequency of `bin` in Hz
    pub fn bin_to_hz(&self, bin: usize, sample_rate: f32) -> f32 {
        normalized_to_hz(bin_to_normalized(bin, self.data_size), sample_rate)
    }

    /// Bring the requested representation up to date
    ///
    /// The new cache state is committed only when every step ran; a step cut
    /// short (stop or FFT failure) leaves the old state in place.
    fn fulfil(&mut self, request: Request) {
        if !self.is_running() {
            return;
        }

        let (next, plan) = resolve(self.cache, request);
        for &step in plan.steps() {
            if !self.run_step(step) {
                return;
            }
        }
        self.cache = next;
    }

    fn run_step(&mut self, step: Step) -> bool {
        match step {
            Step::Forward => return self.forward(),
            Step::Inverse => return self.inverse(),
            Step::PolarToCartesian => {
                let b = &mut self.buffers;
                for i in 0..self.bin_size {
                    let (sin, cos) = b.phase[i].sin_cos();
                    b.real[i] = cos * b.amplitude[i];
                    b.imag[i] = sin * b.amplitude[i];
                }
            }
            Step::NormalizeCartesian => {
                let normalizer = self.window.spectrum_normalizer();
                let b = &mut self.buffers;
                for (re, im) in b.real.iter_mut().zip(b.imag.iter_mut()) {
                    *re *= normalizer;
                    *im *= normalizer;
                }
            }
            Step::CartesianToPolar => {
                let b = &mut self.buffers;
                for i in 0..self.bin_size {
                    b.amplitude[i] = b.real[i].hypot(b.imag[i]);
                    b.phase[i] = b.imag[i].atan2(b.real[i]);
                }
            }
            Step::NormalizePolar => {
                let normalizer = self.window.spectrum_normalizer();
                for amp in self.buffers.amplitude.iter_mut() {
                    *amp *= normalizer;
                }
            }
            Step::NormalizeTimeDomain => {
                let normalizer = self.window.reconstruction_normalizer();
                for s in self.buffers.reconstructed.iter_mut() {
                    *s *= normalizer;
                }
            }
        }
        true
    }

    /// Window the input, transform, and keep only the pass-band
    fn forward(&mut self) -> bool {
        let b = &mut self.buffers;
        self.window.apply(&b.input, &mut b.windowed);

        if let Err(err) = self.backend.forward(&mut b.windowed, &mut b.spectrum) {
            log::error!("Forward transform failed: {}", err);
            return false;
        }

        for (i, c) in b.spectrum.iter().enumerate() {
            // Bail if stopped mid-transform
            if !self.lifecycle.is_running() {
                return false;
            }

            let keep = self.filter.passes(i, self.bin_size);
            b.real[i] = if keep { c.re } else { 0.0 };
            b.imag[i] = if keep { c.im } else { 0.0 };
        }

        true
    }

    /// Inverse transform the cartesian values and divide out the window
    fn inverse(&mut self) -> bool {
        let b = &mut self.buffers;
        for (c, (&re, &im)) in b.spectrum.iter_mut().zip(b.real.iter().zip(&b.imag)) {
            *c = Complex32::new(re, im);
        }

        // c2r requires purely real DC (and Nyquist, for even lengths)
        b.spectrum[0].im = 0.0;
        if self.data_size % 2 == 0 {
            b.spectrum[self.bin_size - 1].im = 0.0;
        }

        if let Err(err) = self.backend.inverse(&mut b.spectrum, &mut b.reconstructed) {
            log::error!("Inverse transform failed: {}", err);
            return false;
        }

        self.window.remove_inplace(&mut b.reconstructed);
        true
    }
}

impl<B: FftBackend> Drop for SpectralAnalyzer<B> {
    fn drop(&mut self) {
        // Stop before the buffers go away
        self.lifecycle.stop();
    }
}

fn validate_data_size(data_size: usize) -> Result<(), SpectrumError> {
    if data_size < 2 {
        return Err(SpectrumError::InvalidDataSize(data_size));
    }
    Ok(())
}
