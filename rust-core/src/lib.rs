//! Spectral Lens - Lazy Spectral Analysis Core
//!
//! Windowed real FFT analysis with on-demand real/imaginary, amplitude/phase
//! and filtered time-domain views, plus a background processor and a few
//! signal helpers. Python bindings are available behind the `python` feature.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod audio;
pub mod error;
pub mod spectrum;

#[cfg(feature = "python")]
mod python_bindings;

pub use audio::{SineOscillator, SpectralProcessor, TempoDetector};
pub use error::SpectrumError;
pub use spectrum::{AnalyzerConfig, BandFilter, FilterKind, SpectralAnalyzer, WindowType};
