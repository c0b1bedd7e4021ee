//! Sine oscillator with frequency glide
//!
//! Produces test input for the analyzer. The phase increment slides toward
//! the target frequency once per block, so sweeps do not click.

use std::f32::consts::PI;

/// Weight of the previous increment in the per-block glide
const GLIDE: f32 = 0.95;

/// Sine oscillator
pub struct SineOscillator {
    sample_rate: f32,
    amplitude: f32,
    target_frequency: f32,

    /// Current increment in cycles per sample
    increment: f32,

    /// Phase in cycles, kept in [0, 1)
    phase: f32,
}

impl SineOscillator {
    /// Create an oscillator that starts at `frequency` (no glide-in)
    pub fn new(sample_rate: f32, frequency: f32, amplitude: f32) -> Self {
        Self {
            sample_rate,
            amplitude,
            target_frequency: frequency,
            increment: frequency / sample_rate,
            phase: 0.0,
        }
    }

    /// Glide toward a new frequency over the next blocks
    pub fn set_frequency(&mut self, frequency: f32) {
        self.target_frequency = frequency;
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    /// Frequency currently being produced, in Hz
    pub fn frequency(&self) -> f32 {
        self.increment * self.sample_rate
    }

    pub fn target_frequency(&self) -> f32 {
        self.target_frequency
    }

    /// Fill a mono block
    pub fn fill(&mut self, block: &mut [f32]) {
        self.fill_interleaved(block, 1);
    }

    /// Fill every channel of an interleaved block with the same signal
    pub fn fill_interleaved(&mut self, block: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        self.increment =
            self.increment * GLIDE + (self.target_frequency / self.sample_rate) * (1.0 - GLIDE);

        for frame in block.chunks_mut(channels) {
            self.phase += self.increment;
            self.phase -= self.phase.floor();
            let value = (self.phase * 2.0 * PI).sin() * self.amplitude;
            frame.fill(value);
        }
    }
}
