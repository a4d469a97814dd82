use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError, ImageReader};
use walkdir::WalkDir;

use super::model::Signal;
use crate::error::{PipelineError, Result};

/// Extensions picked up in image mode.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Extensions picked up in signal mode.
pub const SIGNAL_EXTENSIONS: &[&str] = &["csv"];

// ---------------------------------------------------------------------------
// Corpus – files discovered under an input root
// ---------------------------------------------------------------------------

/// Regular files under `root` whose extension is in the allow-set, in
/// traversal order.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    extensions: &'static [&'static str],
    paths: Vec<PathBuf>,
}

impl Corpus {
    /// Scan `root` recursively. Fails without a partial result when `root`
    /// is not an existing directory.
    pub fn load(root: &Path, extensions: &'static [&'static str]) -> Result<Self> {
        let mut corpus = Corpus {
            root: root.to_path_buf(),
            extensions,
            paths: Vec::new(),
        };
        corpus.reload()?;
        Ok(corpus)
    }

    /// Re-scan the root in place.
    pub fn reload(&mut self) -> Result<()> {
        self.paths = scan(&self.root, self.extensions)?;
        log::debug!(
            "Scanned {}: {} matching file(s)",
            self.root.display(),
            self.paths.len()
        );
        Ok(())
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn scan(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PipelineError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Case-insensitive extension match against the allow-set.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|allowed| e.eq_ignore_ascii_case(allowed)))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Signal loader
// ---------------------------------------------------------------------------

/// Read one signal file.
///
/// Layout: a header line, then one sample per line. The first line is
/// always discarded, so files MUST carry a header row. Each remaining line
/// contributes the decimal number it starts with (after leading whitespace);
/// trailing text such as units or further columns is ignored. Lines with no
/// leading number, or whose number is not finite, are skipped without
/// failing the file.
pub fn parse_signal(path: &Path) -> Result<Signal> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::unreadable(path, e))?;
    let text = String::from_utf8_lossy(&bytes);

    let samples = text.lines().skip(1).filter_map(parse_sample).collect();
    Ok(Signal::new(samples))
}

fn parse_sample(line: &str) -> Option<f64> {
    let text = line.trim_start();
    let len = float_prefix_len(text);
    if len == 0 {
        return None;
    }
    text[..len].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte length of the longest decimal float at the start of `s`:
/// `[+-] digits [. digits] [(e|E) [+-] digits]` with at least one mantissa
/// digit. An exponent marker without digits is not consumed.
fn float_prefix_len(s: &str) -> usize {
    let b = s.as_bytes();
    let skip_digits = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let start = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let mut end = skip_digits(start);
    let mut mantissa_digits = end - start;
    if b.get(end) == Some(&b'.') {
        let frac_end = skip_digits(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(b.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_digits(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

// ---------------------------------------------------------------------------
// Image decoding
// ---------------------------------------------------------------------------

/// Decode an image. The decoder is chosen from the file's leading bytes,
/// falling back to the extension when they are not recognised, so a PNG
/// saved as `.jpg` still decodes.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    guessed_reader(path)?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Width and height from the image header, detected the same way as
/// [`open_image`].
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    guessed_reader(path)?
        .into_dimensions()
        .map_err(|e| decode_error(path, e))
}

fn guessed_reader(path: &Path) -> Result<ImageReader<BufReader<File>>> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| PipelineError::unreadable(path, e))
}

fn decode_error(path: &Path, err: ImageError) -> PipelineError {
    match err {
        ImageError::IoError(source) => PipelineError::unreadable(path, source),
        other => PipelineError::DecodeFailure {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = Corpus::load(&missing, IMAGE_EXTENSIONS).unwrap_err();
        assert!(matches!(err, PipelineError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_root_that_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.png");
        touch(&file);
        assert!(Corpus::load(&file, IMAGE_EXTENSIONS).is_err());
    }

    #[test]
    fn test_recursive_case_insensitive_scan() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.png"));
        touch(&root.join("nested/deeper/B.JPG"));
        touch(&root.join("nested/c.TiFf"));
        touch(&root.join("notes.txt"));
        touch(&root.join("nested/readme"));
        fs::create_dir_all(root.join("folder.png")).unwrap();

        let corpus = Corpus::load(root, IMAGE_EXTENSIONS).unwrap();
        let mut names: Vec<String> = corpus
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["B.JPG", "a.png", "c.TiFf"]);
    }

    #[test]
    fn test_empty_root_gives_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::load(dir.path(), SIGNAL_EXTENSIONS).unwrap();
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_reload_picks_up_new_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("one.csv"));
        let mut corpus = Corpus::load(dir.path(), SIGNAL_EXTENSIONS).unwrap();
        assert_eq!(corpus.len(), 1);

        touch(&dir.path().join("sub/two.csv"));
        assert_eq!(corpus.len(), 1);
        corpus.reload().unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_parse_signal_drops_header_and_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        fs::write(&path, "value\n1.5\nabc\n\n-2\r\n3e1,extra\nnan\n4\n").unwrap();

        let signal = parse_signal(&path).unwrap();
        assert_eq!(signal.samples, vec![1.5, -2.0, 30.0, 4.0]);
    }

    #[test]
    fn test_parse_signal_discards_first_line_even_if_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        fs::write(&path, "10\n20\n30").unwrap();

        let signal = parse_signal(&path).unwrap();
        assert_eq!(signal.samples, vec![20.0, 30.0]);
    }

    #[test]
    fn test_parse_signal_reads_leading_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        fs::write(&path, "h\n1.5 ms\n2;x\n3.25\t7\n4\n").unwrap();
        assert_eq!(parse_signal(&path).unwrap().samples, vec![1.5, 2.0, 3.25, 4.0]);

        fs::write(&path, "h\n  7e\n1e+\n-.5V\n+2.E1x\nx5\n.\n1e400\n").unwrap();
        assert_eq!(parse_signal(&path).unwrap().samples, vec![7.0, 1.0, -0.5, 20.0]);
    }

    #[test]
    fn test_float_prefix_len() {
        assert_eq!(float_prefix_len("12.5abc"), 4);
        assert_eq!(float_prefix_len("-3e-2,1"), 5);
        assert_eq!(float_prefix_len("4e"), 1);
        assert_eq!(float_prefix_len("+"), 0);
        assert_eq!(float_prefix_len("-."), 0);
        assert_eq!(float_prefix_len("abc"), 0);
    }

    #[test]
    fn test_image_format_comes_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let png = image::RgbImage::from_pixel(5, 3, image::Rgb([10, 20, 30]));
        png.save_with_format(&path, image::ImageFormat::Png).unwrap();

        assert_eq!(image_dimensions(&path).unwrap(), (5, 3));
        let decoded = open_image(&path).unwrap().to_rgb8();
        assert_eq!(decoded, png);
    }

    #[test]
    fn test_unrecognised_image_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(
            open_image(&path).unwrap_err(),
            PipelineError::DecodeFailure { .. }
        ));
        assert!(matches!(
            open_image(&dir.path().join("gone.png")).unwrap_err(),
            PipelineError::FileUnreadable { .. }
        ));
    }

    #[test]
    fn test_parse_signal_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_signal(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::FileUnreadable { .. }));
    }
}
