use std::path::Path;

use crate::data::loader::{open_image, Corpus, IMAGE_EXTENSIONS};
use crate::data::model::ImageParams;
use crate::error::{PipelineError, Result};
use crate::imaging;

use super::{ensure_output_dir, output_path, run_batch, RunSummary};

const PROGRESS_EVERY: usize = 10;

// ---------------------------------------------------------------------------
// Image pipeline
// ---------------------------------------------------------------------------

/// Blur, contrast and edge overlay over every image under an input root.
pub struct ImagePipeline {
    corpus: Corpus,
    verbose: bool,
}

impl ImagePipeline {
    /// Scan `input_dir`. Fails with `DirectoryNotFound` when it is missing.
    pub fn new(input_dir: &Path, verbose: bool) -> Result<Self> {
        let corpus = Corpus::load(input_dir, IMAGE_EXTENSIONS)?;
        if verbose {
            log::info!("Found {} images for processing", corpus.len());
        }
        Ok(ImagePipeline { corpus, verbose })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Transform one image into `{output_dir}/{name}`, keeping its format.
    pub fn process_image(&self, path: &Path, output_dir: &Path, params: &ImageParams) -> Result<()> {
        let decoded = open_image(path)?;
        let processed = imaging::transform(&decoded.to_rgb8(), params);

        let out_path = output_path(path, output_dir, "")?;
        processed
            .save(&out_path)
            .map_err(|e| PipelineError::unwritable(&out_path, e))?;

        if self.verbose {
            log::info!(
                "Processed: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );
        }
        Ok(())
    }

    /// Process the whole corpus into `output_dir`.
    ///
    /// `params` is validated first; an invalid blur size fails the run
    /// before any file is read.
    pub fn process_all(&self, output_dir: &Path, params: &ImageParams) -> Result<RunSummary> {
        params.validate()?;
        ensure_output_dir(output_dir)?;
        log::debug!("Image parameters: {params:?}");

        let summary = run_batch(self.corpus.paths(), self.verbose, PROGRESS_EVERY, |path| {
            self.process_image(path, output_dir, params)
        });

        println!(
            "Processed {} images in {:.3} seconds",
            summary.total, summary.elapsed_secs
        );
        if let Some(mean) = summary.mean_secs() {
            println!("Average time per image: {mean:.4} seconds");
        }
        Ok(summary)
    }
}
