//! Error types for the spectral analyzer and its helpers

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("Block length must be at least 2 samples (got {0})")]
    InvalidDataSize(usize),

    #[error("Sample buffer too short: expected {expected} samples, got {actual}")]
    ShortBuffer { expected: usize, actual: usize },

    #[error("FFT processing failed: {0}")]
    Fft(String),

    #[error("Ring buffer too small: {capacity} samples cannot hold a {block}-sample block")]
    RingTooSmall { capacity: usize, block: usize },

    #[error("Spectral processor is already running")]
    ProcessorRunning,
}

impl From<realfft::FftError> for SpectrumError {
    fn from(err: realfft::FftError) -> Self {
        SpectrumError::Fft(err.to_string())
    }
}
