use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Signal – samples retained from one input file
// ---------------------------------------------------------------------------

/// Samples parsed from one signal file, in file order.
///
/// Lines that failed to parse are not represented, so index `i` refers to
/// the `i`-th retained sample rather than the `i`-th line of the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    pub samples: Vec<f64>,
}

impl Signal {
    pub fn new(samples: Vec<f64>) -> Self {
        Signal { samples }
    }
}

// ---------------------------------------------------------------------------
// PeakSet – indices of detected local maxima
// ---------------------------------------------------------------------------

/// Ascending set of sample indices flagged as peaks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeakSet(BTreeSet<usize>);

impl PeakSet {
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for PeakSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        PeakSet(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// OutputRecord – one row of a processed signal file
// ---------------------------------------------------------------------------

/// Header row written before the records.
pub const OUTPUT_HEADER: [&str; 3] = ["original", "filtered", "is_peak"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputRecord {
    pub original: f64,
    pub filtered: f64,
    /// `1` when the sample is a peak, `0` otherwise.
    pub is_peak: u8,
}

// ---------------------------------------------------------------------------
// Processing parameters
// ---------------------------------------------------------------------------

/// Parameters of the image transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageParams {
    /// Gaussian kernel size in pixels. Must be positive and odd.
    pub blur_size: u32,
    /// Contrast multiplier applied after the blur.
    pub contrast_alpha: f64,
    /// Brightness offset added after the multiplier.
    pub contrast_beta: i32,
    /// Blend a Canny edge map over the adjusted image.
    pub edge_detection: bool,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            blur_size: 5,
            contrast_alpha: 1.5,
            contrast_beta: 10,
            edge_detection: true,
        }
    }
}

impl ImageParams {
    /// Copy of `self` with the two swept values replaced.
    pub fn with_sweep_cell(self, blur_size: u32, contrast_alpha: f64) -> Self {
        Self {
            blur_size,
            contrast_alpha,
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_blur_size(self.blur_size)?;
        if !self.contrast_alpha.is_finite() {
            return Err(PipelineError::InvalidParameter(format!(
                "contrast must be a finite number, got {}",
                self.contrast_alpha
            )));
        }
        Ok(())
    }
}

pub fn validate_blur_size(blur_size: u32) -> Result<()> {
    if blur_size == 0 || blur_size % 2 == 0 {
        return Err(PipelineError::InvalidParameter(format!(
            "blur size must be a positive odd number, got {blur_size}"
        )));
    }
    Ok(())
}

/// Parameters of the signal transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalParams {
    /// Nominal moving-average width; `window_size / 2` samples are taken on
    /// each side of the centre.
    pub window_size: usize,
    /// Minimum filtered value for a local maximum to count as a peak.
    pub threshold: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            window_size: 10,
            threshold: 0.5,
        }
    }
}
