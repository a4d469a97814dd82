use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::model::{validate_blur_size, ImageParams};
use crate::error::{PipelineError, Result};

use super::image::ImagePipeline;
use super::RunSummary;

// ---------------------------------------------------------------------------
// Sweep cells
// ---------------------------------------------------------------------------

/// Directory name of one `(blur, contrast)` cell: `blur{B}_contrast{C}` where
/// `C` is `contrast * 10` truncated toward zero.
pub fn cell_dir_name(blur_size: u32, contrast: f64) -> String {
    format!("blur{blur_size}_contrast{}", (contrast * 10.0) as i64)
}

/// Outcome of one cell of the grid.
#[derive(Debug, Serialize)]
pub struct SweepCell {
    pub blur_size: u32,
    pub contrast: f64,
    pub output_dir: PathBuf,
    /// `None` when the cell could not run at all.
    pub summary: Option<RunSummary>,
    pub error: Option<String>,
}

/// Check the whole grid before anything touches the filesystem.
///
/// Every blur size must be valid and no two cells may share a directory,
/// which rejects duplicate contrasts and contrasts that truncate to the
/// same label (e.g. `1.51` and `1.55`).
pub fn validate_grid(blur_sizes: &[u32], contrasts: &[f64]) -> Result<()> {
    if blur_sizes.is_empty() || contrasts.is_empty() {
        return Err(PipelineError::InvalidParameter(
            "sweep needs at least one blur size and one contrast".into(),
        ));
    }
    for &blur in blur_sizes {
        validate_blur_size(blur)?;
    }
    if let Some(c) = contrasts.iter().find(|c| !c.is_finite()) {
        return Err(PipelineError::InvalidParameter(format!(
            "contrast must be a finite number, got {c}"
        )));
    }

    let mut seen: BTreeMap<String, (u32, f64)> = BTreeMap::new();
    for &blur in blur_sizes {
        for &contrast in contrasts {
            let name = cell_dir_name(blur, contrast);
            if let Some((b, c)) = seen.insert(name.clone(), (blur, contrast)) {
                return Err(PipelineError::InvalidParameter(format!(
                    "sweep cells (blur={b}, contrast={c}) and (blur={blur}, contrast={contrast}) \
                     both map to directory '{name}'"
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sweep driver
// ---------------------------------------------------------------------------

impl ImagePipeline {
    /// Run the corpus once per `(blur, contrast)` pair, blur-major.
    ///
    /// Each cell writes into its own subdirectory of `output_root` with
    /// `base` overridden by the pair; `contrast_beta` and `edge_detection`
    /// come from `base`. A cell that cannot create its directory is
    /// recorded as failed and the remaining cells still run.
    pub fn sweep(
        &self,
        output_root: &Path,
        blur_sizes: &[u32],
        contrasts: &[f64],
        base: &ImageParams,
    ) -> Result<Vec<SweepCell>> {
        validate_grid(blur_sizes, contrasts)?;

        let mut cells = Vec::with_capacity(blur_sizes.len() * contrasts.len());
        for &blur_size in blur_sizes {
            for &contrast in contrasts {
                let output_dir = output_root.join(cell_dir_name(blur_size, contrast));
                let params = base.with_sweep_cell(blur_size, contrast);
                if self.verbose() {
                    log::info!("Processing with blur={blur_size}, contrast={contrast}");
                }

                let (summary, error) = match self.process_all(&output_dir, &params) {
                    Ok(summary) => (Some(summary), None),
                    Err(e) => {
                        log::error!("Sweep cell {} failed: {e}", output_dir.display());
                        (None, Some(e.to_string()))
                    }
                };
                cells.push(SweepCell {
                    blur_size,
                    contrast,
                    output_dir,
                    summary,
                    error,
                });
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;

    fn sorted_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_cell_dir_name_truncates() {
        assert_eq!(cell_dir_name(3, 1.0), "blur3_contrast10");
        assert_eq!(cell_dir_name(5, 1.5), "blur5_contrast15");
        assert_eq!(cell_dir_name(7, 2.25), "blur7_contrast22");
        assert_eq!(cell_dir_name(1, 0.05), "blur1_contrast0");
    }

    #[test]
    fn test_validate_grid_rejects_collisions() {
        assert!(validate_grid(&[3, 5], &[1.0, 1.5]).is_ok());
        assert!(validate_grid(&[3], &[1.51, 1.55]).is_err());
        assert!(validate_grid(&[3], &[2.0, 2.0]).is_err());
        assert!(validate_grid(&[3, 3], &[2.0]).is_err());
        assert!(validate_grid(&[4], &[1.0]).is_err());
        assert!(validate_grid(&[], &[1.0]).is_err());
        assert!(validate_grid(&[3], &[f64::NAN]).is_err());
    }

    #[test]
    fn test_sweep_builds_one_directory_per_cell() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png"] {
            RgbImage::from_pixel(6, 6, Rgb([40, 80, 120]))
                .save(input.path().join(name))
                .unwrap();
        }
        fs::write(input.path().join("junk.png"), b"garbage").unwrap();

        let pipeline = ImagePipeline::new(input.path(), false).unwrap();
        let cells = pipeline
            .sweep(output.path(), &[3, 5], &[1.0, 1.5], &ImageParams::default())
            .unwrap();

        let order: Vec<(u32, f64)> = cells.iter().map(|c| (c.blur_size, c.contrast)).collect();
        assert_eq!(order, vec![(3, 1.0), (3, 1.5), (5, 1.0), (5, 1.5)]);

        assert_eq!(
            sorted_names(output.path()),
            vec![
                "blur3_contrast10",
                "blur3_contrast15",
                "blur5_contrast10",
                "blur5_contrast15"
            ]
        );
        for cell in &cells {
            assert_eq!(sorted_names(&cell.output_dir), vec!["a.png", "b.png"]);
            let summary = cell.summary.as_ref().unwrap();
            assert_eq!(summary.failed, 1);
        }
    }

    #[test]
    fn test_invalid_grid_creates_nothing() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let pipeline = ImagePipeline::new(input.path(), false).unwrap();

        let err = pipeline
            .sweep(output.path(), &[3, 6], &[1.0], &ImageParams::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
        assert!(sorted_names(output.path()).is_empty());
    }

    #[test]
    fn test_blocked_cell_does_not_stop_the_sweep() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
            .save(input.path().join("only.png"))
            .unwrap();
        // A regular file where the first cell's directory should go.
        fs::write(output.path().join("blur3_contrast10"), b"").unwrap();

        let pipeline = ImagePipeline::new(input.path(), false).unwrap();
        let cells = pipeline
            .sweep(output.path(), &[3], &[1.0, 2.0], &ImageParams::default())
            .unwrap();

        assert!(cells[0].summary.is_none());
        assert!(cells[0].error.is_some());
        assert_eq!(cells[1].summary.as_ref().unwrap().succeeded, 1);
        assert!(output.path().join("blur3_contrast20/only.png").is_file());
    }
}
