//! Batch orchestration over a [`Corpus`](crate::data::loader::Corpus).
//!
//! Every pipeline runs the same loop: visit each file in corpus order, apply
//! the per-file transform, log and count failures without stopping, then
//! report the totals and wall-clock time.

pub mod analysis;
pub mod image;
pub mod signal;
pub mod sweep;

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// RunSummary – outcome of one corpus pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Files in the corpus.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
}

impl RunSummary {
    /// Mean seconds per file, `None` for an empty corpus.
    pub fn mean_secs(&self) -> Option<f64> {
        (self.total > 0).then(|| self.elapsed_secs / self.total as f64)
    }
}

/// Visit `paths` in order, calling `process` for each.
///
/// Per-file errors are logged at error level and counted. With `verbose`,
/// a progress line is logged every `progress_every` files.
pub fn run_batch<F>(
    paths: &[PathBuf],
    verbose: bool,
    progress_every: usize,
    mut process: F,
) -> RunSummary
where
    F: FnMut(&Path) -> Result<()>,
{
    let start = Instant::now();
    let total = paths.len();
    let mut failed = 0usize;

    for (i, path) in paths.iter().enumerate() {
        if let Err(e) = process(path.as_path()) {
            log::error!("{e}");
            failed += 1;
        }

        if verbose && progress_every > 0 && (i + 1) % progress_every == 0 {
            log::info!("Progress: {}/{}", i + 1, total);
        }
    }

    RunSummary {
        total,
        succeeded: total - failed,
        failed,
        elapsed_secs: start.elapsed().as_secs_f64(),
    }
}

/// Create the output directory of a run.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::unwritable(dir, e))
}

/// `{output_dir}/{prefix}{file name of input}`.
pub fn output_path(input: &Path, output_dir: &Path, prefix: &str) -> Result<PathBuf> {
    let name = input.file_name().ok_or_else(|| {
        PipelineError::InvalidParameter(format!("{} has no file name", input.display()))
    })?;
    let mut file_name = std::ffi::OsString::from(prefix);
    file_name.push(name);
    Ok(output_dir.join(file_name))
}
