//! Sample hand-off, background processing and signal helpers

pub mod buffer;
pub mod oscillator;
pub mod processor;
pub mod tempo;

pub use buffer::{SampleConsumer, SampleProducer, SampleRingBuffer};
pub use oscillator::SineOscillator;
pub use processor::{ProcessorConfig, SpectralFrame, SpectralProcessor};
pub use tempo::TempoDetector;
