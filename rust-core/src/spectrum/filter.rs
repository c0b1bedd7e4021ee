//! Frequency-domain band filter
//!
//! The filter keeps the bins whose index falls inside
//! `[low * bin_size, high * bin_size]` (inclusive at both ends) and zeroes
//! the rest during the forward transform.

/// Named filter presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterKind {
    /// Pass every bin
    #[default]
    None,

    /// Keep bins from 0 up to the cutoff fraction
    LowPass,

    /// Keep bins from the cutoff fraction up to Nyquist
    HighPass,

    /// Keep only the bins at the given fraction
    Notch,
}

/// Pass-band expressed as fractions of the bin count
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandFilter {
    /// Lower edge (0.0 to 1.0)
    pub low: f32,

    /// Upper edge (0.0 to 1.0)
    pub high: f32,
}

impl Default for BandFilter {
    fn default() -> Self {
        Self::pass_all()
    }
}

impl BandFilter {
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// Filter that keeps every bin
    pub fn pass_all() -> Self {
        Self { low: 0.0, high: 1.0 }
    }

    /// Build the pass-band for a preset
    ///
    /// # Arguments
    /// * `frequency` - Cutoff as a fraction of the bin count (ignored for `None`)
    /// * `kind` - Preset type
    pub fn from_kind(frequency: f32, kind: FilterKind) -> Self {
        match kind {
            FilterKind::None => Self::pass_all(),
            FilterKind::LowPass => Self::new(0.0, frequency),
            FilterKind::HighPass => Self::new(frequency, 1.0),
            FilterKind::Notch => Self::new(frequency, frequency),
        }
    }

    /// Whether bin `bin` out of `bin_size` lies inside the pass-band
    #[inline]
    pub fn passes(&self, bin: usize, bin_size: usize) -> bool {
        let i = bin as f32;
        let n = bin_size as f32;
        i >= self.low * n && i <= self.high * n
    }

    pub fn is_pass_all(&self) -> bool {
        self.low <= 0.0 && self.high >= 1.0
    }
}
