use std::path::Path;

use crate::data::filter::{find_peaks, moving_average};
use crate::data::loader::{parse_signal, Corpus, SIGNAL_EXTENSIONS};
use crate::data::model::{OutputRecord, PeakSet, SignalParams, OUTPUT_HEADER};
use crate::error::{PipelineError, Result};

use super::{ensure_output_dir, output_path, run_batch, RunSummary};

/// Prefix of every processed signal file name.
pub const OUTPUT_PREFIX: &str = "processed_";

const PROGRESS_EVERY: usize = 5;

// ---------------------------------------------------------------------------
// Signal pipeline
// ---------------------------------------------------------------------------

/// Smoothing and peak detection over every `.csv` file under an input root.
pub struct SignalPipeline {
    corpus: Corpus,
    verbose: bool,
}

impl SignalPipeline {
    /// Scan `input_dir`. Fails with `DirectoryNotFound` when it is missing.
    pub fn new(input_dir: &Path, verbose: bool) -> Result<Self> {
        let corpus = Corpus::load(input_dir, SIGNAL_EXTENSIONS)?;
        if verbose {
            log::info!("Found {} signal files for processing", corpus.len());
        }
        Ok(SignalPipeline { corpus, verbose })
    }

    /// Process one file into `{output_dir}/processed_{name}`. Returns the
    /// peaks found.
    pub fn process_signal(
        &self,
        path: &Path,
        output_dir: &Path,
        params: &SignalParams,
    ) -> Result<PeakSet> {
        let signal = parse_signal(path)?;
        let filtered = moving_average(&signal.samples, params.window_size);
        let peaks = find_peaks(&filtered, params.threshold);

        let out_path = output_path(path, output_dir, OUTPUT_PREFIX)?;
        let records = signal
            .samples
            .iter()
            .zip(&filtered)
            .enumerate()
            .map(|(i, (&original, &filtered))| OutputRecord {
                original,
                filtered,
                is_peak: peaks.contains(i) as u8,
            });
        write_records(&out_path, records)?;

        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if self.verbose {
            log::info!("Processed: {name} (Found {} peaks)", peaks.len());
        }
        if !peaks.is_empty() {
            let indices: Vec<usize> = peaks.iter().collect();
            log::debug!("Peak indices in {name}: {indices:?}");
        }
        Ok(peaks)
    }

    /// Process the whole corpus into `output_dir`.
    pub fn process_all(&self, output_dir: &Path, params: &SignalParams) -> Result<RunSummary> {
        ensure_output_dir(output_dir)?;
        let summary = run_batch(self.corpus.paths(), self.verbose, PROGRESS_EVERY, |path| {
            self.process_signal(path, output_dir, params).map(|_| ())
        });
        println!(
            "Processed {} signal files in {:.3} seconds",
            summary.total, summary.elapsed_secs
        );
        Ok(summary)
    }
}

fn write_records<I>(path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = OutputRecord>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| PipelineError::unwritable(path, e))?;

    writer
        .write_record(OUTPUT_HEADER)
        .map_err(|e| PipelineError::unwritable(path, e))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| PipelineError::unwritable(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::unwritable(path, e))
}
