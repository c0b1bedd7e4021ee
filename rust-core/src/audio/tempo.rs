//! Tempo detection from peak spacing
//!
//! Meant to run on the analyzer's low-passed, reconstructed blocks: the
//! filter leaves mostly kick/bass energy, and the distance between
//! successive loudness peaks gives the beat period.

use std::collections::VecDeque;

/// Default minimum level for a sample to count as a peak
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Default number of samples on each side a peak must exceed
pub const DEFAULT_NEIGHBORS: usize = 2;

/// Default number of peak distances averaged into the tempo
pub const DEFAULT_HISTORY: usize = 32;

/// Peak-distance tempo detector
pub struct TempoDetector {
    sample_rate: f32,
    threshold: f32,
    neighbors: usize,

    /// Samples since the last peak, counted across blocks
    since_last_peak: usize,

    /// Whether a first peak has been seen
    has_reference: bool,

    /// Most recent distances between successive peaks, in samples
    peak_distances: VecDeque<usize>,

    /// Maximum number of distances kept
    history: usize,
}

impl TempoDetector {
    /// Create a detector with the default threshold and neighborhood
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(sample_rate, DEFAULT_THRESHOLD, DEFAULT_NEIGHBORS)
    }

    /// Create a detector with explicit peak criteria
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `threshold` - Minimum level for a peak
    /// * `neighbors` - Samples on each side the peak must strictly exceed
    pub fn with_params(sample_rate: f32, threshold: f32, neighbors: usize) -> Self {
        Self {
            sample_rate,
            threshold,
            neighbors,
            since_last_peak: 0,
            has_reference: false,
            peak_distances: VecDeque::with_capacity(DEFAULT_HISTORY),
            history: DEFAULT_HISTORY,
        }
    }

    /// Scan a block for peaks
    ///
    /// Peaks are judged within the block only. The distance counter runs on
    /// across blocks, so consecutive blocks must be contiguous in time.
    ///
    /// # Returns
    /// Current tempo estimate in BPM, if one is available
    pub fn process(&mut self, block: &[f32]) -> Option<f32> {
        for i in 0..block.len() {
            if block[i] >= self.threshold && self.is_peak(block, i) {
                if self.has_reference {
                    self.record_distance(self.since_last_peak);
                } else {
                    self.has_reference = true;
                }
                self.since_last_peak = 0;
            }
            self.since_last_peak += 1;
        }

        self.tempo_bpm()
    }

    fn record_distance(&mut self, distance: usize) {
        while self.peak_distances.len() >= self.history {
            self.peak_distances.pop_front();
        }
        self.peak_distances.push_back(distance);
    }

    fn is_peak(&self, block: &[f32], i: usize) -> bool {
        let start = i.saturating_sub(self.neighbors);
        let end = (i + self.neighbors).min(block.len() - 1);

        (start..=end).all(|j| j == i || block[i] > block[j])
    }

    /// Tempo from the mean of the kept peak distances
    ///
    /// Needs at least two recorded distances.
    pub fn tempo_bpm(&self) -> Option<f32> {
        if self.peak_distances.len() < 2 {
            return None;
        }

        let total: usize = self.peak_distances.iter().sum();
        if total == 0 {
            return None;
        }

        let mean = total as f32 / self.peak_distances.len() as f32;
        Some(60.0 * self.sample_rate / mean)
    }

    /// Kept peak distances, oldest first
    pub fn peak_distances(&self) -> Vec<usize> {
        self.peak_distances.iter().copied().collect()
    }

    /// Limit how many recent distances are kept (at least two)
    pub fn set_history(&mut self, history: usize) {
        self.history = history.max(2);
        while self.peak_distances.len() > self.history {
            self.peak_distances.pop_front();
        }
    }

    /// Forget every peak seen so far
    pub fn reset(&mut self) {
        self.since_last_peak = 0;
        self.has_reference = false;
        self.peak_distances.clear();
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn set_neighbors(&mut self, neighbors: usize) {
        self.neighbors = neighbors;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
