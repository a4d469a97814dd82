use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::data::loader::{image_dimensions, Corpus};

// ---------------------------------------------------------------------------
// Corpus statistics
// ---------------------------------------------------------------------------

/// Inclusive `(min, max)` of one image dimension in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    fn include(range: Option<Range>, v: u32) -> Option<Range> {
        Some(match range {
            None => Range { min: v, max: v },
            Some(r) => Range {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub count: usize,
    pub total_bytes: u64,
    pub mean_bytes: f64,
    /// `None` when no image could be decoded.
    pub width: Option<Range>,
    pub height: Option<Range>,
    /// Images whose dimensions could not be read. Their bytes still count.
    pub undecodable: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorpusAnalysis {
    Empty,
    Stats(CorpusStats),
}

/// Size and dimension statistics over an image corpus.
pub fn analyze(corpus: &Corpus) -> CorpusAnalysis {
    if corpus.is_empty() {
        return CorpusAnalysis::Empty;
    }

    let mut total_bytes = 0u64;
    let mut width = None;
    let mut height = None;
    let mut undecodable = 0usize;

    for path in corpus.paths() {
        total_bytes += file_size(path);
        match image_dimensions(path) {
            Ok((w, h)) => {
                width = Range::include(width, w);
                height = Range::include(height, h);
            }
            Err(e) => {
                log::warn!("Skipping dimensions: {e}");
                undecodable += 1;
            }
        }
    }

    let count = corpus.len();
    CorpusAnalysis::Stats(CorpusStats {
        count,
        total_bytes,
        mean_bytes: total_bytes as f64 / count as f64,
        width,
        height,
        undecodable,
    })
}

fn file_size(path: &Path) -> u64 {
    match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            log::warn!("Could not stat {}: {e}", path.display());
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Human-readable report
// ---------------------------------------------------------------------------

impl fmt::Display for CorpusAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusAnalysis::Empty => write!(f, "No images to analyze"),
            CorpusAnalysis::Stats(s) => {
                writeln!(f, "Image Analysis:")?;
                writeln!(f, "Number of images: {}", s.count)?;
                writeln!(f, "Total size: {:.2} MB", s.total_bytes as f64 / (1024.0 * 1024.0))?;
                writeln!(f, "Average size: {:.2} KB/image", s.mean_bytes / 1024.0)?;
                if s.undecodable > 0 {
                    writeln!(f, "Undecodable images: {}", s.undecodable)?;
                }
                write_range(f, "Width", s.width)?;
                writeln!(f)?;
                write_range(f, "Height", s.height)
            }
        }
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, label: &str, range: Option<Range>) -> fmt::Result {
    match range {
        Some(r) => write!(f, "{label} range: {} - {} pixels", r.min, r.max),
        None => write!(f, "{label} range: n/a"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::IMAGE_EXTENSIONS;
    use image::{Rgb, RgbImage};
    use std::fs;

    #[test]
    fn test_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::load(dir.path(), IMAGE_EXTENSIONS).unwrap();
        let analysis = analyze(&corpus);
        assert_eq!(analysis, CorpusAnalysis::Empty);
        assert_eq!(analysis.to_string(), "No images to analyze");
    }

    #[test]
    fn test_stats_over_mixed_corpus() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(10, 4, Rgb([0, 0, 0]))
            .save(dir.path().join("wide.png"))
            .unwrap();
        RgbImage::from_pixel(3, 12, Rgb([9, 9, 9]))
            .save(dir.path().join("tall.png"))
            .unwrap();
        fs::write(dir.path().join("broken.jpg"), vec![0u8; 100]).unwrap();

        let corpus = Corpus::load(dir.path(), IMAGE_EXTENSIONS).unwrap();
        let expected_bytes: u64 = corpus
            .paths()
            .iter()
            .map(|p| fs::metadata(p).unwrap().len())
            .sum();

        let CorpusAnalysis::Stats(stats) = analyze(&corpus) else {
            panic!("expected stats");
        };
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_bytes, expected_bytes);
        assert!((stats.mean_bytes - expected_bytes as f64 / 3.0).abs() < 1e-9);
        assert_eq!(stats.width, Some(Range { min: 3, max: 10 }));
        assert_eq!(stats.height, Some(Range { min: 4, max: 12 }));
        assert_eq!(stats.undecodable, 1);
    }

    #[test]
    fn test_dimensions_ignore_misleading_extension() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(7, 2, Rgb([1, 2, 3]))
            .save_with_format(dir.path().join("scan.jpg"), image::ImageFormat::Png)
            .unwrap();

        let corpus = Corpus::load(dir.path(), IMAGE_EXTENSIONS).unwrap();
        let CorpusAnalysis::Stats(stats) = analyze(&corpus) else {
            panic!("expected stats");
        };
        assert_eq!(stats.undecodable, 0);
        assert_eq!(stats.width, Some(Range { min: 7, max: 7 }));
        assert_eq!(stats.height, Some(Range { min: 2, max: 2 }));
    }

    #[test]
    fn test_all_undecodable_has_no_ranges() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"nope").unwrap();

        let corpus = Corpus::load(dir.path(), IMAGE_EXTENSIONS).unwrap();
        let analysis = analyze(&corpus);
        let CorpusAnalysis::Stats(stats) = &analysis else {
            panic!("expected stats");
        };
        assert_eq!(stats.total_bytes, 4);
        assert_eq!(stats.width, None);
        assert!(analysis.to_string().contains("Width range: n/a"));
    }
}
