//! FFT engine using realfft for real-valued signals
//!
//! Forward (real -> complex) and inverse (complex -> real) transforms with
//! the N/2 + 1 bin convention. Neither direction normalizes.

use crate::error::SpectrumError;
use num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Real-to-complex / complex-to-real transform pair used by the analyzer
///
/// Any engine with the same semantics can stand in for [`RealFftEngine`]:
/// `forward` maps `size` samples to `size / 2 + 1` bins, `inverse` maps
/// them back, both unnormalized.
pub trait FftBackend {
    /// Re-plan for blocks of `size` samples
    fn resize(&mut self, size: usize);

    /// Forward transform. `input` may be used as scratch space.
    fn forward(&mut self, input: &mut [f32], output: &mut [Complex32]) -> Result<(), SpectrumError>;

    /// Inverse transform. `input` may be used as scratch space. The
    /// imaginary parts of the first and last bins must be zero.
    fn inverse(&mut self, input: &mut [Complex32], output: &mut [f32]) -> Result<(), SpectrumError>;

    /// Block length the engine was planned for
    fn size(&self) -> usize;

    /// Number of frequency bins (size/2 + 1 for real FFT)
    fn num_bins(&self) -> usize {
        self.size() / 2 + 1
    }
}

/// FFT engine for real-valued signals
pub struct RealFftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processors
    r2c: Arc<dyn RealToComplex<f32>>,
    c2r: Arc<dyn ComplexToReal<f32>>,

    /// Reusable scratch buffers
    forward_scratch: Vec<Complex32>,
    inverse_scratch: Vec<Complex32>,
}

impl RealFftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(fft_size);
        let c2r = planner.plan_fft_inverse(fft_size);

        let forward_scratch = r2c.make_scratch_vec();
        let inverse_scratch = c2r.make_scratch_vec();

        Self {
            fft_size,
            r2c,
            c2r,
            forward_scratch,
            inverse_scratch,
        }
    }
}

impl FftBackend for RealFftEngine {
    fn resize(&mut self, size: usize) {
        if size != self.fft_size {
            *self = Self::new(size);
        }
    }

    fn forward(&mut self, input: &mut [f32], output: &mut [Complex32]) -> Result<(), SpectrumError> {
        self.r2c
            .process_with_scratch(input, output, &mut self.forward_scratch)?;
        Ok(())
    }

    fn inverse(&mut self, input: &mut [Complex32], output: &mut [f32]) -> Result<(), SpectrumError> {
        self.c2r
            .process_with_scratch(input, output, &mut self.inverse_scratch)?;
        Ok(())
    }

    fn size(&self) -> usize {
        self.fft_size
    }
}

/// Convert bin index to normalized frequency (0 to 1, where 1 = Nyquist)
pub fn bin_to_normalized(bin: usize, fft_size: usize) -> f32 {
    2.0 * bin as f32 / fft_size as f32
}

/// Convert normalized frequency to Hz
///
/// # Arguments
/// * `normalized_freq` - Frequency in units of π rad/sample (0 to 1)
/// * `sample_rate` - Sample rate in Hz
pub fn normalized_to_hz(normalized_freq: f32, sample_rate: f32) -> f32 {
    normalized_freq * sample_rate / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_fft_dc_signal() {
        let mut fft = RealFftEngine::new(64);
        let mut signal = vec![1.0; 64];
        let mut spectrum = vec![Complex32::new(0.0, 0.0); fft.num_bins()];

        fft.forward(&mut signal, &mut spectrum).unwrap();

        // Unnormalized: DC bin holds the sum of the samples
        assert!((spectrum[0].re - 64.0).abs() < 1e-3);
        assert!(spectrum[1..].iter().all(|c| c.norm() < 1e-3));
    }

    #[test]
    fn test_fft_sine_peak() {
        let mut fft = RealFftEngine::new(256);
        let mut signal: Vec<f32> = (0..256)
            .map(|n| (2.0 * PI * 8.0 * n as f32 / 256.0).sin())
            .collect();
        let mut spectrum = vec![Complex32::new(0.0, 0.0); 129];

        fft.forward(&mut signal, &mut spectrum).unwrap();

        let (peak_bin, peak) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm().partial_cmp(&b.norm()).unwrap())
            .unwrap();

        assert_eq!(peak_bin, 8);
        // Peak magnitude is N/2 for a full-scale sine
        assert!((peak.norm() - 128.0).abs() < 0.1);
    }

    #[test]
    fn test_forward_inverse_scale() {
        let mut fft = RealFftEngine::new(32);
        let original: Vec<f32> = (0..32).map(|n| (n as f32 * 0.37).cos()).collect();
        let mut input = original.clone();
        let mut spectrum = vec![Complex32::new(0.0, 0.0); 17];
        let mut output = vec![0.0; 32];

        fft.forward(&mut input, &mut spectrum).unwrap();
        fft.inverse(&mut spectrum, &mut output).unwrap();

        // Round trip through unnormalized transforms scales by N
        for (out, orig) in output.iter().zip(&original) {
            assert!((out / 32.0 - orig).abs() < 1e-4);
        }
    }

    #[test]
    fn test_wrong_length_is_an_error() {
        let mut fft = RealFftEngine::new(32);
        let mut input = vec![0.0; 16];
        let mut spectrum = vec![Complex32::new(0.0, 0.0); 17];

        let result = fft.forward(&mut input, &mut spectrum);
        assert!(matches!(result, Err(SpectrumError::Fft(_))));
    }

    #[test]
    fn test_resize_replans() {
        let mut fft = RealFftEngine::new(32);
        fft.resize(64);
        assert_eq!(fft.size(), 64);
        assert_eq!(fft.num_bins(), 33);

        let mut input = vec![1.0; 64];
        let mut spectrum = vec![Complex32::new(0.0, 0.0); 33];
        fft.forward(&mut input, &mut spectrum).unwrap();
        assert!((spectrum[0].re - 64.0).abs() < 1e-3);
    }

    #[test]
    fn test_frequency_conversion() {
        assert_eq!(bin_to_normalized(0, 1024), 0.0);
        assert!((bin_to_normalized(512, 1024) - 1.0).abs() < 1e-6);
        assert!((normalized_to_hz(1.0, 48000.0) - 24000.0).abs() < 1e-3);
    }
}
