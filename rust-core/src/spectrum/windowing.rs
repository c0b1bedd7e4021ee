//! Window functions for spectral analysis
//!
//! Applies a taper to each block before the forward FFT and divides it back
//! out after the inverse FFT.

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowType {
    /// Half-sine window: w[n] = sin(πn/(M-1))
    /// Zero at n = 0 and (numerically) at n = M-1
    #[default]
    HalfSine,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Non-zero endpoints (0.08), so the inverse window stays finite
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M), at least 2
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f32> {
    let m = length as f64;

    (0..length)
        .map(|n| {
            let n = n as f64;
            let w = match window_type {
                WindowType::HalfSine => (PI * n / (m - 1.0)).sin(),
                WindowType::Hann => 0.5 - 0.5 * (2.0 * PI * n / (m - 1.0)).cos(),
                WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * n / (m - 1.0)).cos(),
                WindowType::Blackman => {
                    0.42 - 0.5 * (2.0 * PI * n / (m - 1.0)).cos()
                        + 0.08 * (4.0 * PI * n / (m - 1.0)).cos()
                }
                WindowType::Rectangular => 1.0,
            };
            w as f32
        })
        .collect()
}

/// Precomputed analysis window for one block length
///
/// Holds the coefficients, their elementwise inverse and their sum. The sum
/// drives the amplitude normalization (`2 / sum`) and the reconstruction
/// normalization (`sum / (2 * N)`).
///
/// Windows that reach zero (half-sine at both ends, Hann, Blackman) have an
/// infinite or very large inverse at those indices, so reconstructed
/// samples there are not meaningful.
#[derive(Debug, Clone)]
pub struct AnalysisWindow {
    window_type: WindowType,
    coefficients: Vec<f32>,
    inverse: Vec<f32>,
    sum: f32,
}

impl AnalysisWindow {
    /// Build the window, its inverse and its sum for `length` samples
    pub fn new(window_type: WindowType, length: usize) -> Self {
        let coefficients = generate_window(window_type, length);
        let sum = coefficients.iter().map(|&w| w as f64).sum::<f64>() as f32;
        let inverse = coefficients.iter().map(|&w| 1.0 / w).collect();

        Self {
            window_type,
            coefficients,
            inverse,
            sum,
        }
    }

    /// Multiply `signal` by the window into `output`
    pub fn apply(&self, signal: &[f32], output: &mut [f32]) {
        for ((out, &s), &w) in output.iter_mut().zip(signal).zip(&self.coefficients) {
            *out = s * w;
        }
    }

    /// Divide the window back out of `signal` in place
    pub fn remove_inplace(&self, signal: &mut [f32]) {
        for (s, &inv) in signal.iter_mut().zip(&self.inverse) {
            *s *= inv;
        }
    }

    /// Scale applied to forward-transform bins (`2 / sum`)
    pub fn spectrum_normalizer(&self) -> f32 {
        2.0 / self.sum
    }

    /// Scale applied to the reconstructed block (`sum / (2 * N)`)
    pub fn reconstruction_normalizer(&self) -> f32 {
        self.sum / (2 * self.coefficients.len()) as f32
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn inverse(&self) -> &[f32] {
        &self.inverse
    }

    pub fn sum(&self) -> f32 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_sine_shape() {
        let window = generate_window(WindowType::HalfSine, 9);

        assert_eq!(window.len(), 9);
        assert_eq!(window[0], 0.0);
        assert!(window[8].abs() < 1e-6);

        // Peak in the middle, symmetric around it
        assert!((window[4] - 1.0).abs() < 1e-6);
        assert!((window[2] - window[6]).abs() < 1e-6);
    }

    #[test]
    fn test_window_generation() {
        let length = 161;

        for window_type in [WindowType::Hann, WindowType::Hamming, WindowType::Blackman] {
            let window = generate_window(window_type, length);
            assert_eq!(window.len(), length);
            assert!((window[0] - window[length - 1]).abs() < 1e-6);
            assert!((window[length / 2] - 1.0).abs() < 1e-6);
        }

        let hamming = generate_window(WindowType::Hamming, length);
        assert!(hamming[0] > 0.07 && hamming[0] < 0.09);
    }

    #[test]
    fn test_rectangular_window() {
        let window = AnalysisWindow::new(WindowType::Rectangular, 100);
        assert!(window.coefficients().iter().all(|&w| w == 1.0));
        assert!((window.sum() - 100.0).abs() < 1e-4);
        assert!((window.spectrum_normalizer() - 0.02).abs() < 1e-6);
        assert!((window.reconstruction_normalizer() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_window() {
        let window = AnalysisWindow::new(WindowType::HalfSine, 16);

        // Endpoint is zero, so its inverse blows up
        assert!(window.inverse()[0].is_infinite());

        for i in 1..15 {
            let product = window.coefficients()[i] * window.inverse()[i];
            assert!((product - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_apply_and_remove() {
        let window = AnalysisWindow::new(WindowType::Hamming, 32);
        let signal: Vec<f32> = (0..32).map(|i| (i as f32 * 0.3).sin()).collect();

        let mut windowed = vec![0.0; 32];
        window.apply(&signal, &mut windowed);
        assert!(windowed[0].abs() < signal[0].abs() + 1e-6);

        window.remove_inplace(&mut windowed);
        for (a, b) in windowed.iter().zip(&signal) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
