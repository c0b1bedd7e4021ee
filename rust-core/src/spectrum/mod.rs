//! Spectral analysis with FFT

pub mod analyzer;
pub mod fft;
pub mod filter;
pub mod freshness;
pub mod windowing;

pub use analyzer::{AnalyzerConfig, SpectralAnalyzer, StopHandle, DEFAULT_DATA_SIZE};
pub use fft::{FftBackend, RealFftEngine};
pub use filter::{BandFilter, FilterKind};
pub use freshness::{CacheState, Freshness};
pub use windowing::{AnalysisWindow, WindowType};
