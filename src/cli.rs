use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data::model::{ImageParams, SignalParams};

#[derive(Parser, Debug)]
#[command(
    name = "rusty-batch",
    version,
    about = "Batch image and signal processing",
    long_about = "Process every image (blur, contrast, edge overlay) or every signal file \
                  (moving average, peak detection) under an input directory.\n\
                  Signal files are .csv with a header row and one sample per line."
)]
pub struct Cli {
    /// Processing mode
    #[arg(long, value_enum, default_value_t = Mode::Image)]
    pub mode: Mode,

    /// Input directory containing files to process
    #[arg(long, default_value = "./input")]
    pub input: PathBuf,

    /// Output directory for processed files
    #[arg(long, default_value = "./output")]
    pub output: PathBuf,

    /// Blur kernel size for image processing (positive, odd)
    #[arg(long, default_value_t = 5)]
    pub blur: u32,

    /// Contrast multiplier for image processing
    #[arg(long, default_value_t = 1.5, allow_negative_numbers = true)]
    pub contrast: f64,

    /// Brightness offset added after the contrast multiplier
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub brightness: i32,

    /// Disable the edge-detection overlay
    #[arg(long, default_value_t = false)]
    pub no_edges: bool,

    /// Window size for signal processing
    #[arg(long, default_value_t = 10)]
    pub window: usize,

    /// Threshold for peak detection
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Blur sizes to sweep, comma-separated (image mode)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub sweep_blur: Vec<u32>,

    /// Contrast multipliers to sweep, comma-separated (image mode)
    #[arg(long, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
    pub sweep_contrast: Vec<f64>,

    /// Run analysis on input files
    #[arg(long, default_value_t = false)]
    pub analysis: bool,

    /// Print analysis and run summaries as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Image,
    Signal,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Image => write!(f, "image"),
            Mode::Signal => write!(f, "signal"),
        }
    }
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    pub fn image_params(&self) -> ImageParams {
        ImageParams {
            blur_size: self.blur,
            contrast_alpha: self.contrast,
            contrast_beta: self.brightness,
            edge_detection: !self.no_edges,
        }
    }

    pub fn signal_params(&self) -> SignalParams {
        SignalParams {
            window_size: self.window,
            threshold: self.threshold,
        }
    }

    /// Sweep grid, if either sweep list was given. A missing list falls
    /// back to the single `--blur` / `--contrast` value.
    pub fn sweep_grid(&self) -> Option<(Vec<u32>, Vec<f64>)> {
        if self.sweep_blur.is_empty() && self.sweep_contrast.is_empty() {
            return None;
        }
        let blurs = if self.sweep_blur.is_empty() {
            vec![self.blur]
        } else {
            self.sweep_blur.clone()
        };
        let contrasts = if self.sweep_contrast.is_empty() {
            vec![self.contrast]
        } else {
            self.sweep_contrast.clone()
        };
        Some((blurs, contrasts))
    }
}
